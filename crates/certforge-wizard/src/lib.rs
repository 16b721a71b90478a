//! Wizard controller and persistent form store for certforge.
//!
//! The controller is the single source of truth for the current step and the
//! wizard data; step views emit discrete change events into it and never own
//! canonical state. The store persists the data across runs with
//! fire-and-forget writes.

pub mod controller;
pub mod store;

pub use controller::{SectionUpdate, WizardController};
pub use store::{
    FailingStore, FormStore, JsonFileStore, MemoryStore, WIZARD_STORE_KEY, load_wizard_data,
    save_wizard_data,
};
