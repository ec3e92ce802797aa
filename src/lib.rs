//! # wc2tb
//!
//! Converts the object layers of a World Creator project into Terrain
//! Builder placement files.
//!
//! ## Pipeline
//!
//! 1. Load the XML project into layers of object groups
//! 2. Decode each group's base64 payload into instance records
//! 3. Move every instance into Terrain Builder space and convert its
//!    quaternion to yaw/pitch/roll
//! 4. Write one `{Layer}.txt` per layer, one line per instance
//!
//! ## Example
//!
//! ```rust,ignore
//! use wc2tb::{DirectorySink, ExportOptions, export_layers, parse_world_creator};
//!
//! let xml = std::fs::read_to_string("project.xml").unwrap();
//! let document = parse_world_creator(&xml).unwrap();
//! let sink = DirectorySink::new(".");
//! let summary = export_layers(&document.layers, &ExportOptions::default(), &sink).unwrap();
//! println!("{} objects", summary.total);
//! ```

pub mod error;
pub mod export;
pub mod terrain_builder;
pub mod worldcreator;

// Re-export commonly used items
pub use error::{DocumentError, ExportError, RecordError};
pub use export::{
    DirectorySink, ExportOptions, ExportSummary, LayerReport, LayerSink, export_layers,
};
pub use terrain_builder::{OrientationConverter, RotationStrategy, export_layer};
pub use worldcreator::{Layer, ObjectGroup, WorldCreatorDocument, parse_world_creator};
