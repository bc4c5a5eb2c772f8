use crate::error::SheetExportError;
use crate::export::ExportFormat;
use crate::extension::ExtractionRequest;
use log::debug;
use std::collections::HashMap;

/// Document-scoped key-value store holding saved export settings.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);
}

/// Settings store kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }
}

/// Key the forms of an export format are saved under.
pub fn settings_key(format: ExportFormat) -> String {
    format!("{}_settings", format)
}

/// Saves the forms last used with `format`, replacing any earlier ones.
pub fn save_settings(
    store: &mut dyn SettingsStore,
    format: ExportFormat,
    requests: &[ExtractionRequest],
) -> Result<(), SheetExportError> {
    let key = settings_key(format);
    store.set(&key, serde_json::to_string(requests)?);
    debug!("saved {} forms under '{}'", requests.len(), key);
    Ok(())
}

/// Loads the forms saved for `format`, if any were saved.
pub fn load_settings(
    store: &dyn SettingsStore,
    format: ExportFormat,
) -> Result<Option<Vec<ExtractionRequest>>, SheetExportError> {
    match store.get(&settings_key(format)) {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}
