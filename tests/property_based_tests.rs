//! Property-based tests for the wizard invariants.

use proptest::prelude::*;
use std::time::Duration;

use certforge::StepId;
use certforge::wizard::{MemoryStore, SectionUpdate, WizardController};
use certforge_utils::types::WizardData;

/// Arbitrary field-mutation events against the controller.
#[derive(Debug, Clone)]
enum Op {
    Template(Option<String>),
    ClientField(String, String),
    InspectionField(String, String),
    Notes(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let template_ids = prop_oneof![
        Just(None),
        Just(Some("eicr".to_string())),
        Just(Some("minor-works".to_string())),
        Just(Some("pat-testing".to_string())),
    ];
    let key = "[a-zA-Z]{1,12}";
    let value = "[ -~]{0,20}";

    prop_oneof![
        template_ids.prop_map(Op::Template),
        (key, value).prop_map(|(k, v)| Op::ClientField(k, v)),
        (key, value).prop_map(|(k, v)| Op::InspectionField(k, v)),
        value.prop_map(|v| Op::Notes(v.to_string())),
    ]
}

fn apply(ctl: &mut WizardController<MemoryStore>, op: Op) {
    match op {
        Op::Template(id) => ctl.update_section(SectionUpdate::Template(id)),
        Op::ClientField(key, value) => ctl.set_client_field(&key, &value),
        Op::InspectionField(key, value) => ctl.set_inspection_field(&key, &value),
        Op::Notes(notes) => ctl.set_notes(&notes),
    }
}

proptest! {
    /// For any sequence of mutations, `last_saved` never decreases.
    #[test]
    fn last_saved_is_monotonically_non_decreasing(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut ctl = WizardController::new(MemoryStore::new(), Duration::from_secs(2));
        let mut previous = ctl.data().last_saved;

        for op in ops {
            apply(&mut ctl, op);
            let current = ctl.data().last_saved;
            prop_assert!(current.is_some());
            if let (Some(prev), Some(cur)) = (previous, current) {
                prop_assert!(cur >= prev);
            }
            previous = current;
        }
    }

    /// Progress is always one of the four step positions and tracks the
    /// current step.
    #[test]
    fn progress_is_position_of_current_step(ops in prop::collection::vec(op_strategy(), 0..20)) {
        let mut ctl = WizardController::new(MemoryStore::new(), Duration::from_secs(2));
        for op in ops {
            apply(&mut ctl, op);
            ctl.next_step();
        }
        let progress = ctl.progress_percent();
        prop_assert!([25u8, 50, 75, 100].contains(&progress));
        prop_assert_eq!(
            progress as usize,
            (ctl.current_step().index() + 1) * 100 / StepId::ALL.len()
        );
    }

    /// Completion predicates are pure: two calls with identical input agree.
    #[test]
    fn is_complete_is_idempotent(ops in prop::collection::vec(op_strategy(), 0..25)) {
        let mut ctl = WizardController::new(MemoryStore::new(), Duration::from_secs(2));
        for op in ops {
            apply(&mut ctl, op);
        }
        for step in StepId::ALL {
            let first = ctl.is_step_complete(step);
            let second = ctl.is_step_complete(step);
            prop_assert_eq!(first, second);
            prop_assert_eq!(ctl.missing_fields(step), ctl.missing_fields(step));
            prop_assert_eq!(first, ctl.missing_fields(step).is_empty());
        }
    }

    /// Navigation invariant: wherever we end up, every step before the
    /// current one satisfied its predicate at the moment of each transition.
    #[test]
    fn forward_navigation_never_skips_an_incomplete_step(
        ops in prop::collection::vec(op_strategy(), 0..25),
        moves in prop::collection::vec(any::<bool>(), 0..10),
    ) {
        let mut ctl = WizardController::new(MemoryStore::new(), Duration::from_secs(2));
        for op in ops {
            apply(&mut ctl, op);
        }
        for forward in moves {
            let before = ctl.current_step();
            let moved = if forward { ctl.next_step() } else { ctl.previous_step() };
            if forward && moved {
                // The step we just left must have been complete.
                prop_assert!(ctl.is_step_complete(before));
            }
        }
    }

    /// Serialization round-trip: any reachable wizard state survives
    /// save/load deep-equal.
    #[test]
    fn wizard_data_round_trips_through_json(ops in prop::collection::vec(op_strategy(), 0..25)) {
        let mut ctl = WizardController::new(MemoryStore::new(), Duration::from_secs(2));
        for op in ops {
            apply(&mut ctl, op);
        }
        let data = ctl.data().clone();
        let json = serde_json::to_string(&data).unwrap();
        let restored: WizardData = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored, data);
    }

    /// Zoom stays within 80..=150 on a step boundary for any input.
    #[test]
    fn zoom_is_always_bounded(percent in any::<u16>()) {
        let zoom = certforge::render::ZoomLevel::new(percent);
        prop_assert!(zoom.percent() >= 80);
        prop_assert!(zoom.percent() <= 150);
        prop_assert_eq!(zoom.percent() % 10, 0);
    }
}
