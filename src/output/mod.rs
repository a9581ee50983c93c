//! File export of assembled rows.

pub mod writer;

pub use writer::{OutputFormat, write_rows};
