//! Step completion validators for the report wizard.
//!
//! Validators are pure functions over the wizard data and the selected
//! template: no side effects, no hidden state. They gate navigation and feed
//! the "missing fields" summary, which lists unmet keys verbatim.

use certforge_templates::ReportTemplate;
use certforge_utils::types::{FaultCode, StepId, WizardData};

/// Check whether a step's completion predicate holds.
///
/// Required keys are template-dependent for the client and inspection steps;
/// with no template selected those steps are incomplete by definition. The
/// review step is complete once every earlier step is.
#[must_use]
pub fn is_complete(step: StepId, data: &WizardData, template: Option<&ReportTemplate>) -> bool {
    missing_fields(step, data, template).is_empty()
}

/// Unmet required field keys for a step, verbatim and in declaration order.
///
/// An empty result means the step's completion predicate holds. A blank or
/// whitespace-only value does not satisfy a required key.
#[must_use]
pub fn missing_fields(
    step: StepId,
    data: &WizardData,
    template: Option<&ReportTemplate>,
) -> Vec<String> {
    match step {
        StepId::Template => match template {
            Some(_) => Vec::new(),
            None => vec!["template".to_string()],
        },
        StepId::Client => match template {
            Some(t) => t
                .required_client_keys()
                .filter(|key| !has_value(data.client_details.get(*key)))
                .map(str::to_string)
                .collect(),
            None => vec!["template".to_string()],
        },
        StepId::Inspection => match template {
            Some(t) => t
                .required_inspection_keys()
                .filter(|key| !has_value(data.inspection_details.fields.get(*key)))
                .map(str::to_string)
                .collect(),
            None => vec!["template".to_string()],
        },
        StepId::Review => StepId::ALL
            .iter()
            .take_while(|s| **s != StepId::Review)
            .flat_map(|s| missing_fields(*s, data, template))
            .collect(),
    }
}

fn has_value(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Validate a fault entry draft.
///
/// An entry is addable only if code, description, and location are all
/// present and non-blank. Returns the missing part names verbatim; an empty
/// result means the draft is addable.
#[must_use]
pub fn fault_missing_parts(
    code: Option<FaultCode>,
    description: &str,
    location: &str,
) -> Vec<String> {
    let mut missing = Vec::new();
    if code.is_none() {
        missing.push("code".to_string());
    }
    if description.trim().is_empty() {
        missing.push("description".to_string());
    }
    if location.trim().is_empty() {
        missing.push("location".to_string());
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use certforge_templates::find;

    fn minor_works_data() -> WizardData {
        let mut data = WizardData::default();
        data.template = Some("minor-works".to_string());
        for (key, value) in [
            ("clientName", "J. Smith"),
            ("clientAddress", "1 Test St"),
            ("installationAddress", "1 Test St"),
            ("installationDescription", "domestic-house"),
        ] {
            data.client_details.insert(key.to_string(), value.to_string());
        }
        data
    }

    #[test]
    fn test_template_step_requires_selection() {
        let data = WizardData::default();
        assert!(!is_complete(StepId::Template, &data, None));
        assert_eq!(
            missing_fields(StepId::Template, &data, None),
            vec!["template"]
        );

        let template = find("eicr");
        assert!(is_complete(StepId::Template, &data, template));
    }

    #[test]
    fn test_client_step_complete_for_minor_works() {
        let data = minor_works_data();
        let template = find("minor-works");
        assert!(is_complete(StepId::Client, &data, template));
    }

    #[test]
    fn test_blank_value_does_not_satisfy_required_key() {
        let mut data = minor_works_data();
        data.client_details
            .insert("clientName".to_string(), "   ".to_string());
        let template = find("minor-works");
        assert_eq!(
            missing_fields(StepId::Client, &data, template),
            vec!["clientName"]
        );
    }

    #[test]
    fn test_inspection_step_lists_unmet_keys_verbatim() {
        let mut data = minor_works_data();
        data.inspection_details
            .fields
            .insert("extentOfInspection".to_string(), "Full installation".to_string());
        let template = find("minor-works");
        assert_eq!(
            missing_fields(StepId::Inspection, &data, template),
            vec!["overallAssessment"]
        );
    }

    #[test]
    fn test_eicr_inspection_needs_inspector_fields() {
        let mut data = minor_works_data();
        data.template = Some("eicr".to_string());
        data.inspection_details
            .fields
            .insert("extentOfInspection".to_string(), "Full".to_string());
        data.inspection_details
            .fields
            .insert("overallAssessment".to_string(), "satisfactory".to_string());
        let template = find("eicr");
        let missing = missing_fields(StepId::Inspection, &data, template);
        assert_eq!(missing, vec!["inspectorName", "inspectorQualification"]);
    }

    #[test]
    fn test_review_aggregates_earlier_steps() {
        let mut data = minor_works_data();
        let template = find("minor-works");
        assert!(!is_complete(StepId::Review, &data, template));

        data.inspection_details
            .fields
            .insert("extentOfInspection".to_string(), "Full installation".to_string());
        data.inspection_details
            .fields
            .insert("overallAssessment".to_string(), "satisfactory".to_string());
        assert!(is_complete(StepId::Review, &data, template));
    }

    #[test]
    fn test_validators_are_pure() {
        let data = minor_works_data();
        let template = find("minor-works");
        let first = missing_fields(StepId::Inspection, &data, template);
        let second = missing_fields(StepId::Inspection, &data, template);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fault_draft_validation() {
        assert!(fault_missing_parts(Some(FaultCode::C1), "Exposed live conductor", "Kitchen").is_empty());
        assert_eq!(
            fault_missing_parts(Some(FaultCode::C1), "", "Kitchen"),
            vec!["description"]
        );
        assert_eq!(
            fault_missing_parts(None, "  ", "\t"),
            vec!["code", "description", "location"]
        );
    }
}
