//! End-to-end wizard flow tests: navigation gating, the minor-works
//! scenario, fault handling, persistence round-trips, and reset.

use std::time::Duration;

use certforge::StepId;
use certforge::wizard::{
    FailingStore, JsonFileStore, MemoryStore, SectionUpdate, WizardController,
};
use certforge_utils::types::FaultCode;

fn controller() -> WizardController<MemoryStore> {
    WizardController::new(MemoryStore::new(), Duration::from_secs(2))
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
fn goto_succeeds_iff_every_earlier_step_is_complete() {
    let mut ctl = controller();

    // Nothing entered: only the template step is reachable.
    assert!(ctl.go_to_step(StepId::Template));
    assert!(!ctl.go_to_step(StepId::Client));
    assert!(!ctl.go_to_step(StepId::Inspection));
    assert!(!ctl.go_to_step(StepId::Review));

    ctl.update_section(SectionUpdate::Template(Some("minor-works".to_string())));
    assert!(ctl.go_to_step(StepId::Client));
    assert!(!ctl.go_to_step(StepId::Inspection));

    fill_minor_works(&mut ctl);
    assert!(ctl.go_to_step(StepId::Inspection));
    assert!(!ctl.go_to_step(StepId::Review));
}

#[test]
fn minor_works_scenario_reaches_review() {
    let mut ctl = controller();
    fill_minor_works(&mut ctl);
    ctl.set_inspection_field("extentOfInspection", "Replacement socket circuit");
    ctl.set_inspection_field("overallAssessment", "satisfactory");

    assert!(ctl.go_to_step(StepId::Review));
    assert_eq!(ctl.current_step(), StepId::Review);
}

#[test]
fn omitting_overall_assessment_keeps_wizard_on_inspection() {
    let mut ctl = controller();
    fill_minor_works(&mut ctl);
    ctl.set_inspection_field("extentOfInspection", "Replacement socket circuit");

    assert!(ctl.go_to_step(StepId::Inspection));
    assert!(!ctl.go_to_step(StepId::Review));
    assert_eq!(ctl.current_step(), StepId::Inspection);
    assert_eq!(
        ctl.missing_fields(StepId::Inspection),
        vec!["overallAssessment"]
    );
}

#[test]
fn backward_navigation_and_editing_does_not_lose_access() {
    let mut ctl = controller();
    fill_minor_works(&mut ctl);
    ctl.set_inspection_field("extentOfInspection", "Full");
    ctl.set_inspection_field("overallAssessment", "satisfactory");
    assert!(ctl.go_to_step(StepId::Review));

    // Go back and edit a client field; review stays reachable because the
    // predicates still hold at call time.
    assert!(ctl.go_to_step(StepId::Client));
    ctl.set_client_field("clientPhone", "01632 960000");
    assert!(ctl.go_to_step(StepId::Review));

    // Clearing a required field revokes access.
    assert!(ctl.go_to_step(StepId::Client));
    ctl.set_client_field("clientName", "");
    assert!(!ctl.go_to_step(StepId::Review));
}

#[test]
fn progress_is_position_based() {
    let mut ctl = controller();
    assert_eq!(ctl.progress_percent(), 25);

    fill_minor_works(&mut ctl);
    assert!(ctl.go_to_step(StepId::Client));
    assert_eq!(ctl.progress_percent(), 50);
    assert!(ctl.go_to_step(StepId::Inspection));
    assert_eq!(ctl.progress_percent(), 75);

    // Progress follows position, not completion: going back lowers it.
    assert!(ctl.go_to_step(StepId::Template));
    assert_eq!(ctl.progress_percent(), 25);
}

#[test]
fn whitespace_only_fault_parts_are_rejected() {
    let mut ctl = controller();

    let attempts = [
        (Some(FaultCode::C1), "", "Kitchen"),
        (Some(FaultCode::C1), "   ", "Kitchen"),
        (Some(FaultCode::C2), "Loose terminal", " \t"),
        (None, "Loose terminal", "Kitchen"),
    ];
    for (code, description, location) in attempts {
        assert!(ctl.add_fault(code, description, location, "").is_err());
        assert!(ctl.data().inspection_details.faults.is_empty());
    }

    assert!(
        ctl.add_fault(Some(FaultCode::C1), "Exposed live conductor", "Kitchen", "")
            .is_ok()
    );
    assert_eq!(ctl.data().inspection_details.faults.len(), 1);
}

#[test]
fn session_round_trips_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir =
        camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let mut ctl = WizardController::new(
        JsonFileStore::new(state_dir.clone()),
        Duration::from_secs(2),
    );
    ctl.update_section(SectionUpdate::Template(Some("eicr".to_string())));
    ctl.set_client_field("clientName", "J. Smith");
    ctl.add_fault(Some(FaultCode::FI), "Unverified bonding", "Bathroom", "Investigate")
        .unwrap();
    let saved = ctl.data().clone();

    // A fresh controller over the same directory rehydrates the session.
    let restored = WizardController::new(JsonFileStore::new(state_dir), Duration::from_secs(2));
    assert_eq!(restored.data(), &saved);
}

#[test]
fn fault_ids_stay_unique_across_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir =
        camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let first_id = {
        let mut ctl = WizardController::new(
            JsonFileStore::new(state_dir.clone()),
            Duration::from_secs(2),
        );
        ctl.add_fault(Some(FaultCode::C3), "No circuit chart", "Consumer unit", "")
            .unwrap()
    };

    let mut restored =
        WizardController::new(JsonFileStore::new(state_dir), Duration::from_secs(2));
    restored.remove_fault(first_id);
    let second_id = restored
        .add_fault(Some(FaultCode::C3), "No circuit chart", "Consumer unit", "")
        .unwrap();

    assert_ne!(first_id, second_id);
}

#[test]
fn storage_failure_is_silent_and_non_fatal() {
    let mut ctl = WizardController::new(FailingStore, Duration::from_secs(2));
    fill_minor_works_failing(&mut ctl);

    // All in-memory behavior still works.
    assert!(ctl.go_to_step(StepId::Client));
    assert!(ctl.data().last_saved.is_some());
}

fn fill_minor_works_failing(ctl: &mut WizardController<FailingStore>) {
    ctl.update_section(SectionUpdate::Template(Some("minor-works".to_string())));
    ctl.set_client_field("clientName", "J. Smith");
    ctl.set_client_field("clientAddress", "1 Test St");
    ctl.set_client_field("installationAddress", "1 Test St");
    ctl.set_client_field("installationDescription", "domestic-house");
}

#[test]
fn reset_is_available_from_the_terminal_step() {
    let mut ctl = controller();
    fill_minor_works(&mut ctl);
    ctl.set_inspection_field("extentOfInspection", "Full");
    ctl.set_inspection_field("overallAssessment", "satisfactory");
    assert!(ctl.go_to_step(StepId::Review));
    ctl.mark_generation_started();

    ctl.reset();
    assert_eq!(ctl.current_step(), StepId::Template);
    assert!(ctl.data().is_empty());
    assert!(!ctl.generation_started());

    // The wizard is usable again immediately.
    ctl.update_section(SectionUpdate::Template(Some("eicr".to_string())));
    assert!(ctl.go_to_step(StepId::Client));
}

#[test]
fn status_output_tracks_the_session() {
    let mut ctl = controller();
    fill_minor_works(&mut ctl);
    assert!(ctl.go_to_step(StepId::Inspection));

    let status = ctl.status_output(false);
    assert_eq!(status.current_step, "inspection");
    assert_eq!(status.progress_percent, 75);
    assert_eq!(status.template.as_deref(), Some("minor-works"));
    assert!(status.completed_steps.contains(&"template".to_string()));
    assert!(status.completed_steps.contains(&"client".to_string()));
    assert!(status.missing_fields.contains_key("inspection"));

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["schema_version"], "1");
    assert_eq!(json["progress_percent"], 75);
}
