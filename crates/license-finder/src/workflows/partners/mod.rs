//! Licensing-partner discovery: projects, candidate rosters, scoring, tiering and outreach.
//!
//! Judgments come from a pluggable [`JudgmentSource`]; everything downstream of the raw
//! payload (validation, redaction, composite score, tiers) is deterministic.

pub mod domain;
pub mod judgment;
pub mod repository;
pub mod results;
pub mod roster;
pub mod router;
pub mod sanitize;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Candidate, CandidateFeedback, CandidateFeedbackInput, CandidateId, EvidenceBullet,
    EvidenceLink, EvidenceLinkId, NewCandidate, NewEvidenceLink, NewProject, OutcomeEvent,
    OutcomeStatus, OutreachDraft, Project, ProjectBrief, ProjectFeedback, ProjectFeedbackInput,
    ProjectId, Provenance, TonePreset,
};
pub use judgment::{
    AssessmentRequest, CannedJudgmentSource, JudgmentError, JudgmentSource,
    OpenAiJudgmentSource, OutreachRequest, RawJudgment, RawOutreachDraft, ScriptedAssessment,
};
pub use repository::{CandidateRecord, ProjectRepository, RepositoryError};
pub use results::{ProjectResults, TierGroup};
pub use roster::{RosterImportError, RosterRow};
pub use router::partner_router;
pub use scoring::{Confidence, ScoreCard, ScoringEngine, Tier};
pub use service::{
    DiscoveryServiceError, ExportFile, FailedCandidate, OutreachRunSummary,
    PartnerDiscoveryService, ProjectOverview, RosterImportSummary, ScoringRunSummary,
};
