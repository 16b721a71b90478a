//! Persistent form store.
//!
//! Key-scoped string storage holding wizard state across runs. Writes are
//! synchronous fire-and-forget: when the underlying storage is unavailable
//! the write is dropped silently (debug-level log only). Loss of autosave is
//! non-fatal; the worst case is re-entering data.

use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, warn};

use certforge_utils::atomic_write::write_file_atomic;
use certforge_utils::types::WizardData;

/// Fixed storage key for the wizard session.
pub const WIZARD_STORE_KEY: &str = "report-wizard-data";

/// Key-scoped string storage.
///
/// `load` returns `None` when no prior value exists; callers supply the
/// default. `save` never reports failure to the caller.
pub trait FormStore {
    /// Load the raw value for a key, if one was previously saved.
    fn load(&self, key: &str) -> Option<String>;

    /// Save a value for a key. Failures are swallowed.
    fn save(&self, key: &str, value: &str);
}

/// File-backed store writing `<dir>/<key>.json` atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: Utf8PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Utf8PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl FormStore for JsonFileStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(path.as_std_path()) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                debug!(key = %key, error = %e, "Form store read failed");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        if let Err(e) = write_file_atomic(&path, value) {
            // Storage unavailability degrades silently; the session keeps its
            // in-memory state.
            debug!(key = %key, error = %e, "Form store write failed");
        }
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cells: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saves recorded (distinct keys).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.borrow().is_empty()
    }
}

impl FormStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.cells.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.cells.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

/// Store whose writes always fail, for exercising silent degradation.
#[derive(Debug, Default)]
pub struct FailingStore;

impl FormStore for FailingStore {
    fn load(&self, _key: &str) -> Option<String> {
        None
    }

    fn save(&self, key: &str, _value: &str) {
        debug!(key = %key, "Form store write dropped (failing store)");
    }
}

/// Load the wizard session, falling back to defaults when nothing was saved
/// or the saved payload does not parse.
#[must_use]
pub fn load_wizard_data(store: &impl FormStore) -> WizardData {
    match store.load(WIZARD_STORE_KEY) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Saved wizard data did not parse; starting fresh");
                WizardData::default()
            }
        },
        None => WizardData::default(),
    }
}

/// Persist the wizard session. Failures are swallowed by the store.
pub fn save_wizard_data(store: &impl FormStore, data: &WizardData) {
    match serde_json::to_string(data) {
        Ok(raw) => store.save(WIZARD_STORE_KEY, &raw),
        Err(e) => debug!(error = %e, "Wizard data serialization failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certforge_utils::types::{FaultCode, FaultEntry};

    #[test]
    fn test_load_returns_default_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(load_wizard_data(&store), WizardData::default());
    }

    #[test]
    fn test_round_trip_is_deep_equal() {
        let store = MemoryStore::new();
        let mut data = WizardData::default();
        data.template = Some("eicr".to_string());
        data.client_details
            .insert("clientName".to_string(), "J. Smith".to_string());
        data.inspection_details.faults.push(FaultEntry {
            id: data.allocate_fault_id(),
            code: FaultCode::C2,
            description: "Damaged socket outlet".to_string(),
            location: "Hallway".to_string(),
            recommendation: Some("Replace accessory".to_string()),
        });
        data.additional_notes = "Access restricted to ground floor".to_string();

        save_wizard_data(&store, &data);
        assert_eq!(load_wizard_data(&store), data);
    }

    #[test]
    fn test_corrupt_payload_falls_back_to_default() {
        let store = MemoryStore::new();
        store.save(WIZARD_STORE_KEY, "not json {{");
        assert_eq!(load_wizard_data(&store), WizardData::default());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap(),
        );

        let mut data = WizardData::default();
        data.template = Some("minor-works".to_string());
        save_wizard_data(&store, &data);
        assert_eq!(load_wizard_data(&store), data);
    }

    #[test]
    fn test_failing_store_degrades_silently() {
        let store = FailingStore;
        let mut data = WizardData::default();
        data.template = Some("eicr".to_string());

        // No panic, no error; the saved value is simply gone.
        save_wizard_data(&store, &data);
        assert_eq!(load_wizard_data(&store), WizardData::default());
    }
}
