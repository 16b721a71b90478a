use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Step identifiers for the report wizard.
///
/// `StepId` represents the four steps of certforge's report wizard. Steps
/// execute in a fixed order, and a step is only reachable once every earlier
/// step's completion predicate holds.
///
/// # Step Order
///
/// ```text
/// Template → Client → Inspection → Review
/// ```
///
/// # Serialization
///
/// `StepId` serializes to its lowercase string representation
/// (e.g., `"template"`, `"client"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    /// Template selection: choose which certificate type to produce.
    Template,
    /// Client details: who the report is for and where the installation is.
    Client,
    /// Inspection details: assessment fields and recorded faults.
    Inspection,
    /// Review: check the collected data and generate the report.
    Review,
}

impl StepId {
    /// All steps in wizard order.
    pub const ALL: [StepId; 4] = [
        StepId::Template,
        StepId::Client,
        StepId::Inspection,
        StepId::Review,
    ];

    /// Returns the canonical lowercase name used in status output and CLI
    /// commands.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Client => "client",
            Self::Inspection => "inspection",
            Self::Review => "review",
        }
    }

    /// Human-readable label for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Template => "Template Selection",
            Self::Client => "Client Details",
            Self::Inspection => "Inspection Details",
            Self::Review => "Review & Generate",
        }
    }

    /// Zero-based position in the fixed step order.
    #[must_use]
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// The step after this one, if any.
    #[must_use]
    pub fn next(&self) -> Option<StepId> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The step before this one, if any.
    #[must_use]
    pub fn previous(&self) -> Option<StepId> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i)).copied()
    }

    /// Parse a step name as used on the CLI.
    ///
    /// # Errors
    ///
    /// Returns an error message naming the valid steps when the input is not
    /// recognized.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "client" => Ok(Self::Client),
            "inspection" => Ok(Self::Inspection),
            "review" => Ok(Self::Review),
            _ => Err(format!(
                "Unknown step '{s}'. Valid steps: template, client, inspection, review"
            )),
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observation classification codes from BS 7671 condition reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultCode {
    /// C1: danger present, risk of injury, immediate remedial action required.
    C1,
    /// C2: potentially dangerous, urgent remedial action required.
    C2,
    /// C3: improvement recommended.
    C3,
    /// FI: further investigation required without delay.
    FI,
}

impl FaultCode {
    /// All codes in severity order.
    pub const ALL: [FaultCode; 4] = [FaultCode::C1, FaultCode::C2, FaultCode::C3, FaultCode::FI];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::C3 => "C3",
            Self::FI => "FI",
        }
    }

    /// The standard wording attached to each classification code.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::C1 => "Danger present",
            Self::C2 => "Potentially dangerous",
            Self::C3 => "Improvement recommended",
            Self::FI => "Further investigation required",
        }
    }

    /// Parse a classification code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error message naming the valid codes when the input is not
    /// recognized.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "C1" => Ok(Self::C1),
            "C2" => Ok(Self::C2),
            "C3" => Ok(Self::C3),
            "FI" => Ok(Self::FI),
            _ => Err(format!(
                "Unknown classification code '{s}'. Valid codes: C1, C2, C3, FI"
            )),
        }
    }
}

impl std::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded fault or observation.
///
/// Code, description, and location are mandatory; the recommendation is
/// optional. Entries are identified by an id from the owning
/// [`WizardData`]'s monotonic counter, so ids stay unique across reloads of
/// the same session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEntry {
    /// Identifier scoped to the owning wizard session.
    pub id: u64,
    /// Classification code.
    pub code: FaultCode,
    /// What was observed.
    pub description: String,
    /// Where it was observed.
    pub location: String,
    /// Suggested remedial action, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Inspection step state: scalar fields plus the ordered fault list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InspectionDetails {
    /// Open mapping of scalar inspection fields (camelCase keys).
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Recorded faults, in entry order.
    #[serde(default)]
    pub faults: Vec<FaultEntry>,
}

impl InspectionDetails {
    /// True when neither scalar fields nor faults have been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.faults.is_empty()
    }
}

/// The full aggregate state of one in-progress report.
///
/// `WizardData` is created with all-empty defaults on first load, rehydrated
/// from persistent storage on subsequent loads, mutated in place through the
/// session, and explicitly reset when the user starts a new report.
///
/// # Invariants
///
/// - `last_saved` is monotonically non-decreasing while the session is
///   active; [`touch`](Self::touch) clamps against regression.
/// - Fault ids come from `next_fault_id` and are never reused within a
///   session, including across save/load round-trips.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WizardData {
    /// Selected template id, immutable once report generation begins.
    #[serde(default)]
    pub template: Option<String>,
    /// Open mapping of client/installation fields (camelCase keys).
    #[serde(default)]
    pub client_details: BTreeMap<String, String>,
    /// Inspection fields and recorded faults.
    #[serde(default)]
    pub inspection_details: InspectionDetails,
    /// Free text passed verbatim to report generation.
    #[serde(default)]
    pub additional_notes: String,
    /// Stamp of the most recent mutation.
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
    /// Monotonic fault-id counter scoped to this session.
    #[serde(default)]
    next_fault_id: u64,
}

impl WizardData {
    /// Stamp `last_saved`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_saved = Some(match self.last_saved {
            Some(prev) if prev > now => prev,
            _ => now,
        });
    }

    /// Allocate the next fault id.
    pub fn allocate_fault_id(&mut self) -> u64 {
        let id = self.next_fault_id;
        self.next_fault_id += 1;
        id
    }

    /// True when nothing has been entered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.template.is_none()
            && self.client_details.is_empty()
            && self.inspection_details.is_empty()
            && self.additional_notes.is_empty()
    }
}

/// Status output for the wizard session, emitted by `certforge status --json`.
///
/// This is a stable output contract; changes are additive only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutput {
    /// Schema version of this output.
    pub schema_version: String,
    /// When this status was produced.
    pub emitted_at: DateTime<Utc>,
    /// Current wizard step.
    pub current_step: String,
    /// Position-based progress, 25..=100.
    pub progress_percent: u8,
    /// Selected template id, if any.
    pub template: Option<String>,
    /// Steps whose completion predicate currently holds, in step order.
    pub completed_steps: Vec<String>,
    /// Unmet required field keys, per incomplete step.
    pub missing_fields: BTreeMap<String, Vec<String>>,
    /// Number of recorded faults.
    pub fault_count: usize,
    /// Stamp of the most recent mutation, if any.
    pub last_saved: Option<DateTime<Utc>>,
    /// Whether a generated report exists in the state directory.
    pub report_generated: bool,
}
