// src/process/mod.rs

pub mod date_parser;
pub mod normalize;
pub mod raw_table;

pub use date_parser::parse_header_date;
pub use normalize::{normalize, NormalizedRecord, Status};
pub use raw_table::{reshape, LayoutError, RawTable, ReshapedTable};
