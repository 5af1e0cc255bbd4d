//! Hotspot format implementations.

mod csv;
mod json;

#[cfg(test)]
mod tests;

pub use self::csv::{CSV_COLUMNS, CsvFormat, detect_delimiter};
pub use self::json::JsonFormat;
