//! Hotspot format import/export system.
//!
//! A trait-based system for encoding and decoding hotspot collections. New
//! formats are added by implementing the `HotspotFormat` trait and registering
//! them with the `FormatRegistry`.
//!
//! ## Supported Formats
//!
//! - **CSV**: Interchange format (`x,y,title,label,url,color`), active hotspots only
//! - **JSON**: Persistence transport with full fidelity, accepts legacy field names
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hotspot_map::format::{FormatRegistry, ImportOptions};
//!
//! let registry = FormatRegistry::new();
//! let csv = registry.get("csv").unwrap();
//! let result = csv.decode(&text, &ImportOptions::default())?;
//! ```

mod error;
pub mod formats;
mod registry;
mod traits;

pub use error::FormatError;
pub use formats::{CSV_COLUMNS, CsvFormat, JsonFormat, detect_delimiter};
pub use registry::FormatRegistry;
pub use traits::{
    ExportOptions, ExportResult, FormatWarning, HotspotFormat, ImportOptions, ImportResult,
    QuoteStyle, WarningSeverity,
};
