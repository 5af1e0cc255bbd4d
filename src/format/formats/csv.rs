//! CSV hotspot format.
//!
//! The one interchange format with an exact on-disk contract:
//!
//! - Header `x,y,title,label,url,color`, one row per active hotspot.
//! - Coordinates rounded to a fixed number of decimals.
//! - Text fields quoted when they contain the delimiter, a quote or a line
//!   break, with embedded quotes doubled.
//!
//! Import is more forgiving: the delimiter (`,` or `;`) is detected from the
//! header line, headers match case-insensitively, malformed rows are skipped
//! and coordinates outside `[0, 100]` are rescaled as a whole data set.

use unicode_normalization::UnicodeNormalization;

use crate::color_utils::normalize_hex;
use crate::constants::{DEGENERATE_AXIS_PERCENT, PERCENT_MAX};
use crate::format::error::FormatError;
use crate::format::traits::{
    ExportOptions, ExportResult, FormatWarning, HotspotFormat, ImportOptions, ImportResult,
    QuoteStyle,
};
use crate::model::{Hotspot, sanitize_color};

/// Canonical column names, in export order.
pub const CSV_COLUMNS: [&str; 6] = ["x", "y", "title", "label", "url", "color"];

const BOM: char = '\u{feff}';

/// Coordinates never carry more decimals than this on export.
const MAX_DECIMAL_PLACES: usize = 10;

/// CSV hotspot format.
///
/// Supports:
/// - Comma or semicolon delimited input (auto-detected)
/// - Quoted fields with embedded delimiters, quotes and line breaks
/// - Coordinates in percent or in any external unit (rescaled on import)
///
/// Does not support:
/// - Inactive hotspots (left out of exports, imports are always active)
/// - Hotspot ids and order (derived from row position on import)
pub struct CsvFormat;

impl HotspotFormat for CsvFormat {
    fn id(&self) -> &'static str {
        "csv"
    }

    fn display_name(&self) -> &'static str {
        "CSV"
    }

    fn extensions(&self) -> &[&'static str] {
        &["csv"]
    }

    fn preserves_inactive(&self) -> bool {
        false
    }

    fn encode(
        &self,
        hotspots: &[Hotspot],
        options: &ExportOptions,
    ) -> Result<ExportResult, FormatError> {
        let mut result = ExportResult::new();

        // Header is written verbatim so quoting policy never touches it
        let mut content = CSV_COLUMNS.join(",");
        content.push('\n');

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(match options.quote_style {
                QuoteStyle::Necessary => csv::QuoteStyle::Necessary,
                QuoteStyle::NonNumeric => csv::QuoteStyle::NonNumeric,
            })
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for hotspot in hotspots {
            if !hotspot.active {
                result.skipped_inactive += 1;
                continue;
            }
            let x = format_coordinate(hotspot.x, options.decimal_places);
            let y = format_coordinate(hotspot.y, options.decimal_places);
            writer.write_record([
                x.as_str(),
                y.as_str(),
                hotspot.title.as_str(),
                hotspot.label.as_str(),
                hotspot.link_url.as_str(),
                hotspot.color.as_str(),
            ])?;
            result.hotspots_exported += 1;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| FormatError::Io(e.into_error()))?;
        let rows = String::from_utf8(bytes)
            .map_err(|e| FormatError::invalid_format(format!("CSV output is not UTF-8: {}", e)))?;
        content.push_str(&rows);

        if result.skipped_inactive > 0 {
            result.add_warning(FormatWarning::info(format!(
                "{} inactive hotspot(s) not exported",
                result.skipped_inactive
            )));
        }

        log::info!(
            "Exported {} hotspots to CSV ({} inactive skipped)",
            result.hotspots_exported,
            result.skipped_inactive
        );

        result.content = content;
        Ok(result)
    }

    fn decode(&self, content: &str, options: &ImportOptions) -> Result<ImportResult, FormatError> {
        let text = prepare_text(content);
        let Some(header_line) = text.lines().find(|line| !line.trim().is_empty()) else {
            return Err(FormatError::invalid_format("CSV input is empty"));
        };
        let delimiter = detect_delimiter(header_line);
        log::debug!("CSV delimiter detected: '{}'", delimiter as char);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let columns = ColumnMap::from_headers(reader.headers()?)?;

        let mut result = ImportResult::new();
        result.delimiter = Some(delimiter);
        let mut rows = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let row = index + 1;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("Skipping CSV row {}: {}", row, e);
                    result.skip_row(FormatWarning::warning(e.to_string()).with_row(row));
                    continue;
                }
            };

            // Spreadsheets pad files with delimiter-only lines
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            match columns.parse_row(&record) {
                Ok(parsed) => rows.push(parsed),
                Err(reason) => {
                    log::warn!("Skipping CSV row {}: {}", row, reason);
                    result.skip_row(FormatWarning::warning(reason).with_row(row));
                }
            }
        }

        if rows.is_empty() {
            return Err(FormatError::NoValidRows {
                skipped: result.skipped_rows,
            });
        }

        let out_of_range = rows
            .iter()
            .any(|r| r.x > PERCENT_MAX || r.y > PERCENT_MAX);
        if out_of_range {
            if options.rescale {
                rescale_rows(&mut rows);
                result.rescaled = true;
                result.add_warning(FormatWarning::info(
                    "Coordinates exceeded 100 and were rescaled into 0-100",
                ));
            } else {
                result.add_warning(FormatWarning::warning(
                    "Coordinates exceeded 100 and were clamped",
                ));
            }
        }

        for (index, parsed) in rows.into_iter().enumerate() {
            if !parsed.color.trim().is_empty() && normalize_hex(&parsed.color).is_none() {
                result.add_warning(FormatWarning::info(format!(
                    "Invalid color '{}' replaced with {}",
                    parsed.color, options.default_color
                )));
            }
            let mut hotspot = Hotspot::new(String::new(), parsed.x, parsed.y)
                .with_title(parsed.title)
                .with_label(parsed.label)
                .with_link_url(parsed.url)
                .with_order(u32::try_from(index).unwrap_or(u32::MAX));
            hotspot.color = sanitize_color(&parsed.color, &options.default_color);
            result.hotspots.push(hotspot);
        }

        log::info!(
            "Imported {} hotspots from CSV ({} rows skipped, rescaled: {})",
            result.hotspots.len(),
            result.skipped_rows,
            result.rescaled
        );

        Ok(result)
    }
}

/// Strip a leading byte-order mark and normalise to NFC.
fn prepare_text(content: &str) -> String {
    content
        .strip_prefix(BOM)
        .unwrap_or(content)
        .nfc()
        .collect()
}

/// Pick `;` when the header line has more semicolons than commas, `,` otherwise.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Round to `places` decimals and print without trailing zeros.
fn format_coordinate(value: f64, places: usize) -> String {
    let factor = 10f64.powi(places.min(MAX_DECIMAL_PLACES) as i32);
    // adding 0.0 turns -0 into 0
    let rounded = (value * factor).round() / factor + 0.0;
    rounded.to_string()
}

/// Parse a coordinate cell. Rejects empty, non-numeric, negative and non-finite values.
fn parse_coordinate(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Map each value linearly from `[min, max]` onto `[0, 100]`.
///
/// A degenerate axis (all values equal) collapses to the midpoint.
fn rescale_axis(values: &mut [f64]) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    for value in values.iter_mut() {
        *value = if span > 0.0 {
            (*value - min) / span * PERCENT_MAX
        } else {
            DEGENERATE_AXIS_PERCENT
        };
    }
}

fn rescale_rows(rows: &mut [CsvRow]) {
    let mut xs: Vec<f64> = rows.iter().map(|r| r.x).collect();
    let mut ys: Vec<f64> = rows.iter().map(|r| r.y).collect();
    rescale_axis(&mut xs);
    rescale_axis(&mut ys);
    for ((row, x), y) in rows.iter_mut().zip(xs).zip(ys) {
        row.x = x;
        row.y = y;
    }
}

/// A row that passed validation, before rescaling.
#[derive(Debug)]
struct CsvRow {
    x: f64,
    y: f64,
    title: String,
    label: String,
    url: String,
    color: String,
}

/// Column positions resolved from the header.
#[derive(Debug)]
struct ColumnMap {
    x: usize,
    y: usize,
    title: Option<usize>,
    label: Option<usize>,
    url: Option<usize>,
    color: Option<usize>,
}

impl ColumnMap {
    /// Match headers case-insensitively; the first occurrence of a name wins.
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, FormatError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let x = find("x").ok_or_else(|| FormatError::missing_column("x"))?;
        let y = find("y").ok_or_else(|| FormatError::missing_column("y"))?;

        Ok(Self {
            x,
            y,
            title: find("title"),
            label: find("label"),
            url: find("url"),
            color: find("color"),
        })
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Result<CsvRow, String> {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };

        let raw_x = record.get(self.x).unwrap_or_default();
        let raw_y = record.get(self.y).unwrap_or_default();
        let x = parse_coordinate(raw_x)
            .ok_or_else(|| format!("invalid x coordinate '{}'", raw_x))?;
        let y = parse_coordinate(raw_y)
            .ok_or_else(|| format!("invalid y coordinate '{}'", raw_y))?;

        Ok(CsvRow {
            x,
            y,
            title: cell(self.title),
            label: cell(self.label),
            url: cell(self.url),
            color: cell(self.color),
        })
    }
}
