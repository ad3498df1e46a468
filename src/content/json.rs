use std::fs;
use std::path::{Path, PathBuf};

use super::{ContentError, ContentProvider, EventCatalog};

/// Catalog compiled into the crate.
pub const BUILTIN_EVENTS: &str = include_str!("builtin_events.json");

/// Serves [`BUILTIN_EVENTS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContent;

impl ContentProvider for StaticContent {
    fn load_event_catalog(&self) -> Result<EventCatalog, ContentError> {
        read_catalog_from_str(BUILTIN_EVENTS)
    }
}

/// Reads a catalog from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileContent {
    path: PathBuf,
}

impl JsonFileContent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentProvider for JsonFileContent {
    fn load_event_catalog(&self) -> Result<EventCatalog, ContentError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| ContentError::Io {
            path: self.path.clone(),
            source,
        })?;
        let catalog = read_catalog_from_str(&contents)?;
        tracing::debug!(
            path = %self.path.display(),
            templates = catalog.default_event_templates.len(),
            "loaded event catalog"
        );
        Ok(catalog)
    }
}

fn read_catalog_from_str(data: &str) -> Result<EventCatalog, ContentError> {
    let catalog: EventCatalog = serde_json::from_str(data)?;
    catalog.validate()?;
    Ok(catalog)
}
