use serde::{Deserialize, Serialize};

use detailops_core::TenantId;

/// One reported vehicle-part issue, flattened for prompting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotNote {
    pub part: String,
    pub issue: String,
    pub severity: String,
}

/// One answered intake question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Input snapshot for estimate/summary prompts.
///
/// Deliberately decoupled from the assessment entity: the caller flattens
/// whatever it has into strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSnapshot {
    pub tenant_id: TenantId,
    /// "2019 Audi A4"-style label.
    pub vehicle: String,
    pub hotspots: Vec<HotspotNote>,
    pub services: Vec<String>,
    pub answers: Vec<QuestionAnswer>,
}
