//! Lookup of hotspot formats by id or file extension.

use std::path::Path;

use crate::format::formats::{CsvFormat, JsonFormat};
use crate::format::traits::HotspotFormat;

/// Known hotspot formats, in registration order.
///
/// Starts with the JSON transport and the CSV interchange format.
pub struct FormatRegistry {
    formats: Vec<Box<dyn HotspotFormat>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            formats: Vec::new(),
        };
        registry.register(Box::new(JsonFormat));
        registry.register(Box::new(CsvFormat));
        registry
    }

    /// Add a format. One with the same id replaces the existing entry in place.
    pub fn register(&mut self, format: Box<dyn HotspotFormat>) {
        match self.formats.iter_mut().find(|f| f.id() == format.id()) {
            Some(slot) => *slot = format,
            None => self.formats.push(format),
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn HotspotFormat> {
        self.formats
            .iter()
            .find(|f| f.id() == id)
            .map(|f| f.as_ref())
    }

    /// Formats claiming `ext` (case-insensitive, leading dot optional).
    pub fn by_extension(&self, ext: &str) -> Vec<&dyn HotspotFormat> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        self.formats
            .iter()
            .filter(|f| f.extensions().iter().any(|e| *e == ext))
            .map(|f| f.as_ref())
            .collect()
    }

    /// First format claiming the extension of `path`.
    pub fn for_path(&self, path: &Path) -> Option<&dyn HotspotFormat> {
        let ext = path.extension()?.to_str()?;
        self.by_extension(ext).into_iter().next()
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn HotspotFormat> {
        self.formats.iter().map(|f| f.as_ref())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.id()).collect()
    }

    /// The hotspot transport format used by persistence.
    pub fn native(&self) -> &dyn HotspotFormat {
        self.get("json").unwrap_or(&JsonFormat)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
