//! Report template catalog for certforge.
//!
//! The catalog is an immutable static table, injected into consumers rather
//! than imported as a mutable singleton. Each template carries the per-step
//! field specifications that drive validation and optional-field display in
//! later wizard steps.

use serde::Serialize;

/// Difficulty tier of a report template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Basic,
    Intermediate,
    Advanced,
}

impl DifficultyTier {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Category of work the template certifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Inspection,
    Installation,
    Testing,
    Certification,
}

impl TemplateCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inspection => "inspection",
            Self::Installation => "installation",
            Self::Testing => "testing",
            Self::Certification => "certification",
        }
    }
}

/// A single field collected by a wizard step.
///
/// Keys are camelCase strings, matching the open mapping stored in the wizard
/// data and the flat `formData` sent to the generation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Mapping key (e.g. `clientName`).
    pub key: &'static str,
    /// Display label (e.g. `Client name`).
    pub label: &'static str,
    /// Whether the step is incomplete without this field.
    pub required: bool,
}

impl FieldSpec {
    const fn required(key: &'static str, label: &'static str) -> Self {
        Self { key, label, required: true }
    }

    const fn optional(key: &'static str, label: &'static str) -> Self {
        Self { key, label, required: false }
    }
}

/// An immutable report template from the fixed catalog.
///
/// Chosen once in the template step; determines which optional fields appear
/// in later steps and which keys are required for step completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTemplate {
    /// Stable identifier used in persistence and the generation payload.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description shown in the template picker.
    pub description: &'static str,
    /// Difficulty tier.
    pub tier: DifficultyTier,
    /// Category of certified work.
    pub category: TemplateCategory,
    /// Feature highlights shown in the template picker.
    pub features: &'static [&'static str],
    /// Fields collected by the client step.
    pub client_fields: &'static [FieldSpec],
    /// Scalar fields collected by the inspection step.
    pub inspection_fields: &'static [FieldSpec],
}

impl ReportTemplate {
    /// Required keys for the given field list, in declaration order.
    fn required_keys(fields: &'static [FieldSpec]) -> impl Iterator<Item = &'static str> {
        fields.iter().filter(|f| f.required).map(|f| f.key)
    }

    /// Required client-step keys.
    pub fn required_client_keys(&self) -> impl Iterator<Item = &'static str> {
        Self::required_keys(self.client_fields)
    }

    /// Required inspection-step keys.
    pub fn required_inspection_keys(&self) -> impl Iterator<Item = &'static str> {
        Self::required_keys(self.inspection_fields)
    }
}

/// Client fields shared by every template.
const COMMON_CLIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("clientName", "Client name"),
    FieldSpec::required("clientAddress", "Client address"),
    FieldSpec::optional("clientPhone", "Client phone"),
    FieldSpec::optional("clientEmail", "Client email"),
    FieldSpec::required("installationAddress", "Installation address"),
    FieldSpec::required("installationDescription", "Installation description"),
];

static CATALOG: [ReportTemplate; 6] = [
    ReportTemplate {
        id: "eicr",
        name: "Electrical Installation Condition Report",
        description: "Periodic condition report on an existing installation with classified observations",
        tier: DifficultyTier::Advanced,
        category: TemplateCategory::Inspection,
        features: &[
            "C1/C2/C3/FI observation schedule",
            "Supply characteristics and earthing details",
            "Inspector sign-off",
        ],
        client_fields: COMMON_CLIENT_FIELDS,
        inspection_fields: &[
            FieldSpec::required("extentOfInspection", "Extent of inspection"),
            FieldSpec::required("overallAssessment", "Overall assessment"),
            FieldSpec::required("inspectorName", "Inspector name"),
            FieldSpec::required("inspectorQualification", "Inspector qualification"),
            FieldSpec::optional("agreedLimitations", "Agreed limitations"),
            FieldSpec::optional("supplyCharacteristics", "Supply characteristics"),
            FieldSpec::optional("earthingArrangement", "Earthing arrangement"),
        ],
    },
    ReportTemplate {
        id: "minor-works",
        name: "Minor Electrical Installation Works Certificate",
        description: "Certificate for an addition or alteration that does not extend to a new circuit",
        tier: DifficultyTier::Basic,
        category: TemplateCategory::Installation,
        features: &[
            "Single-circuit scope",
            "Essential test results",
            "Departures from BS 7671 noted",
        ],
        client_fields: COMMON_CLIENT_FIELDS,
        inspection_fields: &[
            FieldSpec::required("extentOfInspection", "Extent of inspection"),
            FieldSpec::required("overallAssessment", "Overall assessment"),
            FieldSpec::optional("circuitDetails", "Circuit details"),
            FieldSpec::optional("protectiveDevice", "Protective device"),
        ],
    },
    ReportTemplate {
        id: "eic",
        name: "Electrical Installation Certificate",
        description: "Certificate for new installation work or a major alteration",
        tier: DifficultyTier::Intermediate,
        category: TemplateCategory::Certification,
        features: &[
            "Design, construction, and inspection declarations",
            "Schedule of test results",
            "Next inspection recommendation",
        ],
        client_fields: COMMON_CLIENT_FIELDS,
        inspection_fields: &[
            FieldSpec::required("extentOfInspection", "Extent of inspection"),
            FieldSpec::required("overallAssessment", "Overall assessment"),
            FieldSpec::optional("designerName", "Designer name"),
            FieldSpec::optional("constructorName", "Constructor name"),
            FieldSpec::optional("testResultsSummary", "Test results summary"),
        ],
    },
    ReportTemplate {
        id: "periodic-inspection",
        name: "Periodic Inspection Report",
        description: "Routine re-inspection of an installation against the current regulations",
        tier: DifficultyTier::Intermediate,
        category: TemplateCategory::Inspection,
        features: &[
            "Inspection type and interval tracking",
            "Overall condition verdict",
            "Observation schedule",
        ],
        client_fields: COMMON_CLIENT_FIELDS,
        inspection_fields: &[
            FieldSpec::required("extentOfInspection", "Extent of inspection"),
            FieldSpec::required("overallAssessment", "Overall assessment"),
            FieldSpec::required("inspectionType", "Inspection type"),
            FieldSpec::required("overallCondition", "Overall condition"),
            FieldSpec::optional("retestInterval", "Recommended retest interval"),
        ],
    },
    ReportTemplate {
        id: "pat-testing",
        name: "Portable Appliance Testing Report",
        description: "In-service inspection and testing of portable electrical equipment",
        tier: DifficultyTier::Basic,
        category: TemplateCategory::Testing,
        features: &[
            "Appliance register",
            "Pass/fail summary",
            "Test instrument record",
        ],
        client_fields: COMMON_CLIENT_FIELDS,
        inspection_fields: &[
            FieldSpec::required("extentOfInspection", "Extent of inspection"),
            FieldSpec::required("overallAssessment", "Overall assessment"),
            FieldSpec::optional("applianceCount", "Number of appliances tested"),
            FieldSpec::optional("testInstrument", "Test instrument"),
        ],
    },
    ReportTemplate {
        id: "emergency-lighting",
        name: "Emergency Lighting Certificate",
        description: "Completion and periodic certificate for emergency lighting systems",
        tier: DifficultyTier::Advanced,
        category: TemplateCategory::Certification,
        features: &[
            "System type and duration test record",
            "Luminaire schedule",
            "BS 5266 cross-reference",
        ],
        client_fields: COMMON_CLIENT_FIELDS,
        inspection_fields: &[
            FieldSpec::required("extentOfInspection", "Extent of inspection"),
            FieldSpec::required("overallAssessment", "Overall assessment"),
            FieldSpec::optional("systemType", "System type"),
            FieldSpec::optional("durationTestResult", "Duration test result"),
        ],
    },
];

/// The full template catalog, in display order.
#[must_use]
pub fn catalog() -> &'static [ReportTemplate] {
    &CATALOG
}

/// Look up a template by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static ReportTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_six_templates_with_unique_ids() {
        let templates = catalog();
        assert_eq!(templates.len(), 6);

        let mut ids: Vec<&str> = templates.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_find_known_and_unknown() {
        assert_eq!(find("minor-works").map(|t| t.name), Some("Minor Electrical Installation Works Certificate"));
        assert!(find("gas-safety").is_none());
    }

    #[test]
    fn test_minor_works_required_keys() {
        let template = find("minor-works").unwrap();
        let client: Vec<&str> = template.required_client_keys().collect();
        assert_eq!(
            client,
            vec![
                "clientName",
                "clientAddress",
                "installationAddress",
                "installationDescription"
            ]
        );

        let inspection: Vec<&str> = template.required_inspection_keys().collect();
        assert_eq!(inspection, vec!["extentOfInspection", "overallAssessment"]);
    }

    #[test]
    fn test_eicr_requires_inspector_fields() {
        let template = find("eicr").unwrap();
        let inspection: Vec<&str> = template.required_inspection_keys().collect();
        assert!(inspection.contains(&"inspectorName"));
        assert!(inspection.contains(&"inspectorQualification"));
    }

    #[test]
    fn test_periodic_inspection_requires_type_and_condition() {
        let template = find("periodic-inspection").unwrap();
        let inspection: Vec<&str> = template.required_inspection_keys().collect();
        assert!(inspection.contains(&"inspectionType"));
        assert!(inspection.contains(&"overallCondition"));
    }

    #[test]
    fn test_every_category_is_represented() {
        let categories: Vec<TemplateCategory> = catalog().iter().map(|t| t.category).collect();
        assert!(categories.contains(&TemplateCategory::Inspection));
        assert!(categories.contains(&TemplateCategory::Installation));
        assert!(categories.contains(&TemplateCategory::Testing));
        assert!(categories.contains(&TemplateCategory::Certification));
    }
}
