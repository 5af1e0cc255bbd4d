//! Map persistence.
//!
//! The core never owns storage; it hands [`ImageMap`] values to a
//! [`MapRepository`]. Hotspots travel as the JSON array produced by
//! [`JsonFormat`], the same transport a key-value backend stores per map.

use std::collections::HashMap;

use thiserror::Error;

use crate::format::{ExportOptions, FormatError, HotspotFormat, ImportOptions, JsonFormat};
use crate::model::{ImageMap, MapId};

/// Errors from a map repository.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// No map stored under this id
    #[error("Map not found: {id}")]
    NotFound { id: MapId },

    /// Stored hotspot data couldn't be encoded or decoded
    #[error("Hotspot data error: {0}")]
    Format(#[from] FormatError),
}

/// Storage collaborator for image maps.
pub trait MapRepository {
    /// Load a map by id.
    fn load_map(&self, id: &str) -> Result<ImageMap, PersistenceError>;

    /// Store a map, assigning a new id when it has none. Returns the id.
    fn save_map(&mut self, map: &ImageMap) -> Result<MapId, PersistenceError>;
}

/// A stored map row: scalar fields plus the hotspot JSON blob.
#[derive(Debug, Clone)]
struct StoredMap {
    title: String,
    image_url: String,
    hotspots_json: String,
}

/// Repository keeping maps in memory, keyed by `map_<n>` ids.
#[derive(Debug, Default)]
pub struct InMemoryMapRepository {
    maps: HashMap<MapId, StoredMap>,
    /// Counter for generating unique map IDs.
    next_id: u64,
}

impl InMemoryMapRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Stored map ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.maps.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Raw hotspot JSON stored for a map.
    pub fn hotspots_json(&self, id: &str) -> Option<&str> {
        self.maps.get(id).map(|m| m.hotspots_json.as_str())
    }

    fn fresh_id(&mut self) -> MapId {
        loop {
            self.next_id += 1;
            let id = format!("map_{}", self.next_id);
            if !self.maps.contains_key(&id) {
                return id;
            }
        }
    }
}

impl MapRepository for InMemoryMapRepository {
    fn load_map(&self, id: &str) -> Result<ImageMap, PersistenceError> {
        let stored = self.maps.get(id).ok_or_else(|| PersistenceError::NotFound {
            id: id.to_string(),
        })?;

        let decoded = JsonFormat.decode(&stored.hotspots_json, &ImportOptions::default())?;
        if decoded.skipped_rows > 0 {
            log::warn!(
                "Map {}: {} stored hotspots could not be read",
                id,
                decoded.skipped_rows
            );
        }

        Ok(ImageMap {
            id: Some(id.to_string()),
            title: stored.title.clone(),
            image_url: stored.image_url.clone(),
            hotspots: decoded.hotspots,
        })
    }

    fn save_map(&mut self, map: &ImageMap) -> Result<MapId, PersistenceError> {
        let encoded = JsonFormat.encode(&map.hotspots, &ExportOptions::default())?;

        let id = match map.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.fresh_id(),
        };

        self.maps.insert(
            id.clone(),
            StoredMap {
                title: map.title.clone(),
                image_url: map.image_url.clone(),
                hotspots_json: encoded.content,
            },
        );
        log::info!("Saved map {} ({} hotspots)", id, map.hotspots.len());
        Ok(id)
    }
}
