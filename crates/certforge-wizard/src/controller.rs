//! Wizard controller.
//!
//! Single source of truth for the current step and the wizard data. Step
//! views emit discrete change events (section replacement, field change,
//! fault add/remove) into the controller; every mutation stamps `last_saved`
//! and persists immediately. Only the displayed "last saved" time is
//! debounced.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use certforge_templates::ReportTemplate;
use certforge_utils::logging::log_step_transition;
use certforge_utils::types::{FaultCode, FaultEntry, StatusOutput, StepId, WizardData};

use crate::store::{FormStore, load_wizard_data, save_wizard_data};

/// Replacement of one named slice of the wizard data.
#[derive(Debug, Clone)]
pub enum SectionUpdate {
    /// Replace the selected template id.
    Template(Option<String>),
    /// Replace the whole client-details mapping.
    ClientDetails(BTreeMap<String, String>),
    /// Replace the scalar inspection fields (faults are untouched).
    InspectionFields(BTreeMap<String, String>),
    /// Replace the free-text notes.
    AdditionalNotes(String),
}

/// Orchestrates the wizard session: current step, accessibility rules,
/// progress computation, and the autosave display stamp.
///
/// Navigation follows the fixed step order. A step is accessible only when
/// every earlier step's completion predicate holds at call time; backward
/// navigation is always allowed, and an inaccessible transition is a silent
/// no-op.
pub struct WizardController<S: FormStore> {
    store: S,
    data: WizardData,
    current: StepId,
    generation_started: bool,
    autosave_debounce: Duration,
    last_mutation: Option<Instant>,
    displayed_saved: Option<DateTime<Utc>>,
}

impl<S: FormStore> WizardController<S> {
    /// Load the session from the store, starting at the template step.
    pub fn new(store: S, autosave_debounce: Duration) -> Self {
        let data = load_wizard_data(&store);
        let displayed_saved = data.last_saved;
        Self {
            store,
            data,
            current: StepId::Template,
            generation_started: false,
            autosave_debounce,
            last_mutation: None,
            displayed_saved,
        }
    }

    /// The canonical wizard data.
    #[must_use]
    pub fn data(&self) -> &WizardData {
        &self.data
    }

    /// The current step.
    #[must_use]
    pub fn current_step(&self) -> StepId {
        self.current
    }

    /// The selected template, resolved against the catalog.
    #[must_use]
    pub fn template(&self) -> Option<&'static ReportTemplate> {
        self.data
            .template
            .as_deref()
            .and_then(certforge_templates::find)
    }

    /// Whether report generation has begun (locks the template).
    #[must_use]
    pub fn generation_started(&self) -> bool {
        self.generation_started
    }

    /// Mark that report generation has begun. The template is immutable from
    /// this point on.
    pub fn mark_generation_started(&mut self) {
        self.generation_started = true;
    }

    /// Replace one named slice of the wizard data.
    ///
    /// Stamps `last_saved` and persists. A template change after generation
    /// has begun, or to an id not in the catalog, is a no-op.
    pub fn update_section(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::Template(template) => {
                if self.generation_started && template != self.data.template {
                    warn!("Template change ignored: report generation has begun");
                    return;
                }
                if let Some(id) = &template
                    && certforge_templates::find(id).is_none()
                {
                    warn!(template = %id, "Template change ignored: unknown template");
                    return;
                }
                self.data.template = template;
            }
            SectionUpdate::ClientDetails(details) => {
                self.data.client_details = details;
            }
            SectionUpdate::InspectionFields(fields) => {
                self.data.inspection_details.fields = fields;
            }
            SectionUpdate::AdditionalNotes(notes) => {
                self.data.additional_notes = notes;
            }
        }
        self.mutated();
    }

    /// Apply a single field-changed event from the client step.
    ///
    /// A blank value clears the field.
    pub fn set_client_field(&mut self, key: &str, value: &str) {
        apply_field(&mut self.data.client_details, key, value);
        self.mutated();
    }

    /// Apply a single field-changed event from the inspection step.
    pub fn set_inspection_field(&mut self, key: &str, value: &str) {
        apply_field(&mut self.data.inspection_details.fields, key, value);
        self.mutated();
    }

    /// Replace the free-text notes.
    pub fn set_notes(&mut self, notes: &str) {
        self.data.additional_notes = notes.to_string();
        self.mutated();
    }

    /// Add a fault entry.
    ///
    /// # Errors
    ///
    /// Returns the missing part names when code, description, or location is
    /// blank; the fault list is left unchanged.
    pub fn add_fault(
        &mut self,
        code: Option<FaultCode>,
        description: &str,
        location: &str,
        recommendation: &str,
    ) -> Result<u64, Vec<String>> {
        let missing = certforge_validation::fault_missing_parts(code, description, location);
        if !missing.is_empty() {
            debug!(missing = ?missing, "Fault entry rejected");
            return Err(missing);
        }

        let id = self.data.allocate_fault_id();
        let recommendation = recommendation.trim();
        self.data.inspection_details.faults.push(FaultEntry {
            id,
            // Validated non-None above.
            code: code.expect("fault code validated"),
            description: description.trim().to_string(),
            location: location.trim().to_string(),
            recommendation: if recommendation.is_empty() {
                None
            } else {
                Some(recommendation.to_string())
            },
        });
        self.mutated();
        Ok(id)
    }

    /// Remove a fault entry by id. Returns false when no entry matches.
    pub fn remove_fault(&mut self, id: u64) -> bool {
        let before = self.data.inspection_details.faults.len();
        self.data.inspection_details.faults.retain(|f| f.id != id);
        let removed = self.data.inspection_details.faults.len() != before;
        if removed {
            self.mutated();
        }
        removed
    }

    /// Whether a step's completion predicate holds right now.
    #[must_use]
    pub fn is_step_complete(&self, step: StepId) -> bool {
        certforge_validation::is_complete(step, &self.data, self.template())
    }

    /// Unmet required field keys for a step, verbatim.
    #[must_use]
    pub fn missing_fields(&self, step: StepId) -> Vec<String> {
        certforge_validation::missing_fields(step, &self.data, self.template())
    }

    /// Whether a step can be navigated to: every earlier step's completion
    /// predicate must hold at call time.
    #[must_use]
    pub fn step_accessible(&self, step: StepId) -> bool {
        StepId::ALL[..step.index()]
            .iter()
            .all(|s| self.is_step_complete(*s))
    }

    /// Navigate to a step. An inaccessible target is a silent no-op; returns
    /// whether the transition happened.
    pub fn go_to_step(&mut self, step: StepId) -> bool {
        if !self.step_accessible(step) {
            debug!(target = %step, "Navigation blocked: earlier step incomplete");
            return false;
        }
        if step != self.current {
            log_step_transition(self.current.as_str(), step.as_str());
            self.current = step;
        }
        true
    }

    /// Move forward one step, gated by accessibility.
    pub fn next_step(&mut self) -> bool {
        match self.current.next() {
            Some(step) => self.go_to_step(step),
            None => false,
        }
    }

    /// Move back one step. Always allowed.
    pub fn previous_step(&mut self) -> bool {
        match self.current.previous() {
            Some(step) => {
                log_step_transition(self.current.as_str(), step.as_str());
                self.current = step;
                true
            }
            None => false,
        }
    }

    /// Position-based progress: `(index + 1) / total * 100`, monotonic with
    /// step order (not with completion).
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        (((self.current.index() + 1) * 100) / StepId::ALL.len()) as u8
    }

    /// Reset to defaults and return to the template step. Available at any
    /// time, including after generation.
    pub fn reset(&mut self) {
        self.data = WizardData::default();
        self.generation_started = false;
        self.current = StepId::Template;
        self.displayed_saved = None;
        self.last_mutation = None;
        save_wizard_data(&self.store, &self.data);
    }

    /// Advance the autosave display stamp if the debounce window has elapsed
    /// since the last mutation and the session has meaningful content.
    ///
    /// Returns whether the displayed stamp changed. Persistence itself is not
    /// debounced; this is advisory UI feedback only.
    pub fn autosave_tick(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_mutation else {
            return false;
        };
        if now.duration_since(last) < self.autosave_debounce {
            return false;
        }
        self.last_mutation = None;

        let has_content =
            self.data.template.is_some() || !self.data.client_details.is_empty();
        if !has_content {
            return false;
        }

        self.displayed_saved = self.data.last_saved;
        true
    }

    /// The stamp shown as "Last saved" in the UI (debounced).
    #[must_use]
    pub fn last_saved_display(&self) -> Option<DateTime<Utc>> {
        self.displayed_saved
    }

    /// Build the status output contract for this session.
    #[must_use]
    pub fn status_output(&self, report_generated: bool) -> StatusOutput {
        let completed_steps = StepId::ALL
            .iter()
            .filter(|s| self.is_step_complete(**s))
            .map(|s| s.as_str().to_string())
            .collect();

        let mut missing_fields = BTreeMap::new();
        for step in StepId::ALL {
            let missing = self.missing_fields(step);
            if !missing.is_empty() {
                missing_fields.insert(step.as_str().to_string(), missing);
            }
        }

        StatusOutput {
            schema_version: "1".to_string(),
            emitted_at: Utc::now(),
            current_step: self.current.as_str().to_string(),
            progress_percent: self.progress_percent(),
            template: self.data.template.clone(),
            completed_steps,
            missing_fields,
            fault_count: self.data.inspection_details.faults.len(),
            last_saved: self.data.last_saved,
            report_generated,
        }
    }

    fn mutated(&mut self) {
        self.data.touch(Utc::now());
        save_wizard_data(&self.store, &self.data);
        self.last_mutation = Some(Instant::now());
    }
}

fn apply_field(map: &mut BTreeMap<String, String>, key: &str, value: &str) {
    if value.trim().is_empty() {
        map.remove(key);
    } else {
        map.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FailingStore, MemoryStore};

    fn controller() -> WizardController<MemoryStore> {
        WizardController::new(MemoryStore::new(), Duration::ZERO)
    }

    fn fill_minor_works(ctl: &mut WizardController<MemoryStore>) {
        ctl.update_section(SectionUpdate::Template(Some("minor-works".to_string())));
        for (key, value) in [
            ("clientName", "J. Smith"),
            ("clientAddress", "1 Test St"),
            ("installationAddress", "1 Test St"),
            ("installationDescription", "domestic-house"),
        ] {
            ctl.set_client_field(key, value);
        }
    }

    #[test]
    fn test_initial_state() {
        let ctl = controller();
        assert_eq!(ctl.current_step(), StepId::Template);
        assert_eq!(ctl.progress_percent(), 25);
        assert!(ctl.data().is_empty());
    }

    #[test]
    fn test_forward_navigation_is_gated() {
        let mut ctl = controller();
        assert!(!ctl.go_to_step(StepId::Client));
        assert_eq!(ctl.current_step(), StepId::Template);

        ctl.update_section(SectionUpdate::Template(Some("eicr".to_string())));
        assert!(ctl.go_to_step(StepId::Client));
        assert_eq!(ctl.current_step(), StepId::Client);
    }

    #[test]
    fn test_backward_navigation_always_allowed() {
        let mut ctl = controller();
        fill_minor_works(&mut ctl);
        assert!(ctl.go_to_step(StepId::Client));
        assert!(ctl.previous_step());
        assert_eq!(ctl.current_step(), StepId::Template);
    }

    #[test]
    fn test_minor_works_scenario_reaches_review() {
        let mut ctl = controller();
        fill_minor_works(&mut ctl);
        ctl.set_inspection_field("extentOfInspection", "New socket circuit only");

        // overallAssessment still missing: review is rejected.
        assert!(ctl.go_to_step(StepId::Inspection));
        assert!(!ctl.go_to_step(StepId::Review));
        assert_eq!(ctl.current_step(), StepId::Inspection);

        ctl.set_inspection_field("overallAssessment", "satisfactory");
        assert!(ctl.go_to_step(StepId::Review));
        assert_eq!(ctl.progress_percent(), 100);
    }

    #[test]
    fn test_progress_at_inspection_is_75() {
        let mut ctl = controller();
        fill_minor_works(&mut ctl);
        assert!(ctl.go_to_step(StepId::Inspection));
        assert_eq!(ctl.progress_percent(), 75);
    }

    #[test]
    fn test_unknown_template_is_ignored() {
        let mut ctl = controller();
        ctl.update_section(SectionUpdate::Template(Some("gas-safety".to_string())));
        assert!(ctl.data().template.is_none());
    }

    #[test]
    fn test_template_locked_after_generation_starts() {
        let mut ctl = controller();
        fill_minor_works(&mut ctl);
        ctl.mark_generation_started();
        ctl.update_section(SectionUpdate::Template(Some("eicr".to_string())));
        assert_eq!(ctl.data().template.as_deref(), Some("minor-works"));
    }

    #[test]
    fn test_fault_rejected_when_incomplete() {
        let mut ctl = controller();
        let result = ctl.add_fault(Some(FaultCode::C1), "", "Kitchen", "");
        assert_eq!(result.unwrap_err(), vec!["description"]);
        assert!(ctl.data().inspection_details.faults.is_empty());
    }

    #[test]
    fn test_fault_add_and_remove_by_id() {
        let mut ctl = controller();
        let id = ctl
            .add_fault(
                Some(FaultCode::C2),
                "Cracked consumer unit cover",
                "Garage",
                "Replace cover",
            )
            .unwrap();
        assert_eq!(ctl.data().inspection_details.faults.len(), 1);

        assert!(ctl.remove_fault(id));
        assert!(ctl.data().inspection_details.faults.is_empty());
        assert!(!ctl.remove_fault(id));
    }

    #[test]
    fn test_last_saved_is_monotonic() {
        let mut ctl = controller();
        ctl.update_section(SectionUpdate::Template(Some("eicr".to_string())));
        let first = ctl.data().last_saved.unwrap();
        ctl.set_client_field("clientName", "J. Smith");
        ctl.set_notes("note");
        let last = ctl.data().last_saved.unwrap();
        assert!(last >= first);
    }

    #[test]
    fn test_autosave_tick_debounces_display() {
        let mut ctl = WizardController::new(MemoryStore::new(), Duration::from_secs(2));
        ctl.update_section(SectionUpdate::Template(Some("eicr".to_string())));
        // Window has not elapsed yet.
        assert!(!ctl.autosave_tick(Instant::now()));
        // Simulate the window elapsing.
        assert!(ctl.autosave_tick(Instant::now() + Duration::from_secs(3)));
        assert_eq!(ctl.last_saved_display(), ctl.data().last_saved);
        // Stamp consumed until the next mutation.
        assert!(!ctl.autosave_tick(Instant::now() + Duration::from_secs(10)));
    }

    #[test]
    fn test_autosave_tick_requires_content() {
        let mut ctl = controller();
        ctl.set_notes("only notes");
        // Neither template nor client details present: no display stamp.
        assert!(!ctl.autosave_tick(Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn test_reset_restores_defaults_from_any_step() {
        let mut ctl = controller();
        fill_minor_works(&mut ctl);
        ctl.set_inspection_field("extentOfInspection", "Full");
        ctl.set_inspection_field("overallAssessment", "satisfactory");
        assert!(ctl.go_to_step(StepId::Review));

        ctl.reset();
        assert_eq!(ctl.current_step(), StepId::Template);
        assert!(ctl.data().is_empty());
        assert!(!ctl.generation_started());
    }

    #[test]
    fn test_storage_failure_keeps_in_memory_state() {
        let mut ctl = WizardController::new(FailingStore, Duration::ZERO);
        ctl.update_section(SectionUpdate::Template(Some("eicr".to_string())));
        ctl.set_client_field("clientName", "J. Smith");
        assert_eq!(ctl.data().template.as_deref(), Some("eicr"));
        assert_eq!(
            ctl.data().client_details.get("clientName").map(String::as_str),
            Some("J. Smith")
        );
    }

    #[test]
    fn test_status_output_shape() {
        let mut ctl = controller();
        fill_minor_works(&mut ctl);
        let status = ctl.status_output(false);
        assert_eq!(status.schema_version, "1");
        assert_eq!(status.current_step, "template");
        assert!(status.completed_steps.contains(&"client".to_string()));
        assert!(status.missing_fields.contains_key("inspection"));
        assert!(!status.report_generated);
    }
}
