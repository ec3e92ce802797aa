//! World Creator project reading
//!
//! This module loads the object layers of a World Creator XML project and
//! decodes the packed instance data of each object group.

pub mod parser;
pub mod records;
pub mod types;

pub use parser::parse_world_creator;
pub use records::{decode_records, encode_records, parse_data_count};
pub use types::*;
