//! Tileset schema scanning
//!
//! Reads an OpenMapTiles-style tileset definition and finds the imposm
//! tables whose rows carry an hstore `tags` column.

pub mod scanner;
pub mod types;

pub use scanner::{find_tables, load_mappings, scan_tileset, table_qualifies, TABLE_PREFIX};
pub use types::*;
