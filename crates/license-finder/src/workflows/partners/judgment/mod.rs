//! Boundary to the external source of structured judgments.
//!
//! Implementations return raw, unvalidated payloads; `validation` turns them into
//! [`Judgment`] and [`OutreachCopy`] or rejects them.

mod canned;
mod openai;
pub mod prompts;
mod validation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::ProjectBrief;
use super::scoring::ProofPoint;

pub use canned::{baseline_judgment, CannedJudgmentSource, ScriptedAssessment};
pub use openai::{extract_first_json, OpenAiJudgmentSource};
pub use validation::{
    validate_judgment, validate_outreach, Judgment, JudgmentValidationError, OutreachCopy,
    RawCriterionScores, RawJudgment, RawOutreachDraft, RawProofPoint, MAX_OUTREACH_BODY_CHARS,
    MAX_OUTREACH_SUBJECT_CHARS,
};

/// Bullets handed to the judgment source per candidate.
pub const MAX_EVIDENCE_BULLETS: usize = 8;

/// Evidence statement with its originating link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub text: String,
    pub url: String,
}

/// Everything known about one candidate when asking for a judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub brief: ProjectBrief,
    pub candidate_name: String,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub custom_data: BTreeMap<String, String>,
    pub evidence: Vec<EvidenceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachRequest {
    pub brief: ProjectBrief,
    pub candidate_name: String,
    pub website: Option<String>,
    pub proof_points: Vec<ProofPoint>,
}

/// Source of per-candidate assessments and outreach copy.
pub trait JudgmentSource: Send + Sync {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawJudgment, JudgmentError>;
    fn draft_outreach(&self, request: &OutreachRequest) -> Result<RawOutreachDraft, JudgmentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JudgmentError {
    #[error("judgment transport failed: {0}")]
    Transport(String),
    #[error("judgment backend returned status {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("judgment response was not valid JSON: {0}")]
    Malformed(String),
    #[error("judgment source unavailable: {0}")]
    Unavailable(String),
    #[error("judgment rejected: {0}")]
    Rejected(#[from] JudgmentValidationError),
}
