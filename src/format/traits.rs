//! Trait definitions for hotspot format implementations.

use serde::{Deserialize, Serialize};

use crate::constants::{CSV_DECIMAL_PLACES, DEFAULT_HOTSPOT_COLOR};
use crate::format::error::FormatError;
use crate::model::Hotspot;

/// Trait for hotspot format encode/decode implementations.
///
/// Formats work on in-memory text: reading and writing files is the host's
/// job, the codec only ever sees fully resolved Unicode content.
pub trait HotspotFormat: Send + Sync {
    /// Unique identifier for this format (e.g., "csv", "json").
    fn id(&self) -> &'static str;

    /// Name shown to users.
    fn display_name(&self) -> &'static str;

    /// File extensions this format uses.
    fn extensions(&self) -> &[&'static str];

    /// Whether inactive hotspots survive an encode/decode cycle.
    fn preserves_inactive(&self) -> bool;

    /// Encode hotspots (in collection order) to text.
    fn encode(&self, hotspots: &[Hotspot], options: &ExportOptions)
    -> Result<ExportResult, FormatError>;

    /// Decode hotspots from text.
    fn decode(&self, content: &str, options: &ImportOptions) -> Result<ImportResult, FormatError>;
}

/// How text fields are quoted on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// Quote only fields containing the delimiter, a quote or a line break.
    #[default]
    Necessary,
    /// Quote every text field; numbers stay bare.
    NonNumeric,
}

/// How hotspots are written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Decimal places for coordinates.
    pub decimal_places: usize,

    /// Quoting policy for text fields (CSV only).
    pub quote_style: QuoteStyle,

    /// Pretty-print structured output (JSON only).
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            decimal_places: CSV_DECIMAL_PLACES,
            quote_style: QuoteStyle::default(),
            pretty: false,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set decimal places for coordinates.
    pub fn decimal_places(mut self, places: usize) -> Self {
        self.decimal_places = places;
        self
    }

    /// Set the quoting policy.
    pub fn quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    /// Pretty-print output where the format supports it.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// How incoming text is interpreted.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Whether to merge with existing hotspots or replace them.
    pub merge: bool,

    /// Color for rows that have none or an invalid one.
    pub default_color: String,

    /// Rescale coordinates into `[0, 100]` when any exceed 100 (CSV only).
    pub rescale: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            merge: false,
            default_color: DEFAULT_HOTSPOT_COLOR.to_string(),
            rescale: true,
        }
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set merge mode (true = append to existing, false = replace).
    pub fn merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Set the fallback color.
    pub fn default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    /// Enable or disable coordinate rescaling.
    pub fn rescale(mut self, rescale: bool) -> Self {
        self.rescale = rescale;
        self
    }
}

/// Encoded text plus what was left out.
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Encoded text.
    pub content: String,

    /// Number of hotspots written.
    pub hotspots_exported: usize,

    /// Number of inactive hotspots left out.
    pub skipped_inactive: usize,

    pub warnings: Vec<FormatWarning>,
}

impl ExportResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Decoded hotspots plus per-row diagnostics.
#[derive(Debug, Default)]
pub struct ImportResult {
    /// Decoded hotspots in file order.
    ///
    /// Ids may be empty; the store assigns fresh ones on insert.
    pub hotspots: Vec<Hotspot>,

    /// Number of data rows rejected.
    pub skipped_rows: usize,

    /// Coordinates were rescaled from an external unit system.
    pub rescaled: bool,

    /// Field delimiter that was detected (CSV only).
    pub delimiter: Option<u8>,

    /// Per-row problems.
    pub warnings: Vec<FormatWarning>,
}

impl ImportResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    /// Count a rejected row and keep its reason.
    pub fn skip_row(&mut self, warning: FormatWarning) {
        self.skipped_rows += 1;
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Note attached to an import or export, optionally tied to a row.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatWarning {
    /// 1-based data row (header excluded) this warning relates to, if any.
    pub row: Option<usize>,

    pub message: String,

    pub severity: WarningSeverity,
}

impl FormatWarning {
    pub fn new(message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            row: None,
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Warning)
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Nothing wrong; worth telling the user.
    Info,
    /// A row was skipped or a value changed.
    Warning,
}
