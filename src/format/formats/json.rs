//! JSON hotspot transport.
//!
//! Hotspots are stored by the persistence layer as a JSON array. Writing
//! always uses the current camelCase schema; reading accepts the loosely typed
//! records older editors produced (`blogUrl` or `url` instead of `linkUrl`,
//! numbers as strings, missing fields).

use serde::Deserialize;
use serde_json::Value;

use crate::format::error::FormatError;
use crate::format::traits::{
    ExportOptions, ExportResult, FormatWarning, HotspotFormat, ImportOptions, ImportResult,
};
use crate::model::{Hotspot, sanitize_color};

/// JSON hotspot array format.
///
/// Lossless for every hotspot field, including inactive hotspots.
pub struct JsonFormat;

impl HotspotFormat for JsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "Hotspot JSON"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn preserves_inactive(&self) -> bool {
        true
    }

    fn encode(
        &self,
        hotspots: &[Hotspot],
        options: &ExportOptions,
    ) -> Result<ExportResult, FormatError> {
        let content = if options.pretty {
            serde_json::to_string_pretty(hotspots)?
        } else {
            serde_json::to_string(hotspots)?
        };

        log::debug!("Encoded {} hotspots as JSON", hotspots.len());

        Ok(ExportResult {
            content,
            hotspots_exported: hotspots.len(),
            ..ExportResult::default()
        })
    }

    fn decode(&self, content: &str, options: &ImportOptions) -> Result<ImportResult, FormatError> {
        let mut result = ImportResult::new();

        let trimmed = content.trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() {
            return Ok(result);
        }

        let entries = match serde_json::from_str::<Value>(trimmed)? {
            Value::Null => return Ok(result),
            Value::Array(entries) => entries,
            other => {
                return Err(FormatError::invalid_format(format!(
                    "expected a JSON array of hotspots, found {}",
                    value_kind(&other)
                )));
            }
        };

        for (index, entry) in entries.into_iter().enumerate() {
            let row = index + 1;
            let raw = match serde_json::from_value::<RawHotspot>(entry) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("Skipping hotspot entry {}: {}", row, e);
                    result.skip_row(FormatWarning::warning(e.to_string()).with_row(row));
                    continue;
                }
            };
            match raw.into_hotspot(index, &options.default_color) {
                Ok(hotspot) => result.hotspots.push(hotspot),
                Err(reason) => {
                    log::warn!("Skipping hotspot entry {}: {}", row, reason);
                    result.skip_row(FormatWarning::warning(reason).with_row(row));
                }
            }
        }

        log::debug!(
            "Decoded {} hotspots from JSON ({} skipped)",
            result.hotspots.len(),
            result.skipped_rows
        );

        Ok(result)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A hotspot record as found in stored data; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawHotspot {
    id: Option<Value>,
    x: Option<Value>,
    y: Option<Value>,
    title: Option<Value>,
    label: Option<Value>,
    link_url: Option<Value>,
    blog_url: Option<Value>,
    url: Option<Value>,
    color: Option<Value>,
    active: Option<Value>,
    order: Option<Value>,
}

impl RawHotspot {
    fn into_hotspot(self, index: usize, default_color: &str) -> Result<Hotspot, String> {
        let x = number(self.x.as_ref()).ok_or("missing or invalid x coordinate")?;
        let y = number(self.y.as_ref()).ok_or("missing or invalid y coordinate")?;

        // First non-empty of the current name and the legacy ones
        let link_url = [&self.link_url, &self.blog_url, &self.url]
            .into_iter()
            .map(|v| text(v.as_ref()))
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default();

        let order = number(self.order.as_ref())
            .filter(|o| *o >= 0.0)
            .map(|o| o.min(f64::from(u32::MAX)) as u32)
            .unwrap_or_else(|| u32::try_from(index).unwrap_or(u32::MAX));

        let mut hotspot = Hotspot::new(text(self.id.as_ref()), x, y)
            .with_title(text(self.title.as_ref()))
            .with_label(text(self.label.as_ref()))
            .with_link_url(link_url)
            .with_active(flag(self.active.as_ref()).unwrap_or(true))
            .with_order(order);
        hotspot.color = sanitize_color(&text(self.color.as_ref()), default_color);
        Ok(hotspot)
    }
}

/// Text value of a string, number or boolean; empty for anything else.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Finite number from a number or a numeric string.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Boolean from a bool, `0`/`1` or a `"true"`/`"false"`/`"1"`/`"0"` string.
fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_and_number_helpers() {
        assert_eq!(text(Some(&json!("a"))), "a");
        assert_eq!(text(Some(&json!(7))), "7");
        assert_eq!(text(Some(&json!(null))), "");
        assert_eq!(text(None), "");

        assert_eq!(number(Some(&json!(12.5))), Some(12.5));
        assert_eq!(number(Some(&json!(" 40 "))), Some(40.0));
        assert_eq!(number(Some(&json!("abc"))), None);
        assert_eq!(number(Some(&json!([1]))), None);
    }

    #[test]
    fn test_flag_helper() {
        assert_eq!(flag(Some(&json!(false))), Some(false));
        assert_eq!(flag(Some(&json!("1"))), Some(true));
        assert_eq!(flag(Some(&json!(0))), Some(false));
        assert_eq!(flag(Some(&json!("maybe"))), None);
        assert_eq!(flag(None), None);
    }
}
