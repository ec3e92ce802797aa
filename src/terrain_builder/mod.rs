//! Terrain Builder placement output
//!
//! Converts decoded World Creator instances into Terrain Builder's
//! semicolon-delimited import lines.

pub mod orientation;
pub mod placement;

pub use orientation::{EulerAngles, OrientationConverter, RotationStrategy};
pub use placement::{LayerExport, OutputRecord, TB_OFFSET, export_layer};
