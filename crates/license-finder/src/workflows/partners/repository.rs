use serde::{Deserialize, Serialize};

use super::domain::{
    Candidate, CandidateFeedback, CandidateId, EvidenceLink, OutcomeEvent, OutreachDraft, Project,
    ProjectId,
};
use super::judgment::{EvidenceRef, MAX_EVIDENCE_BULLETS};
use super::scoring::{ScoreCard, Tier};

/// Repository aggregate for one candidate and everything hanging off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate: Candidate,
    #[serde(default)]
    pub evidence: Vec<EvidenceLink>,
    pub score_card: Option<ScoreCard>,
    pub outreach: Option<OutreachDraft>,
    #[serde(default)]
    pub outcome_events: Vec<OutcomeEvent>,
    pub feedback: Option<CandidateFeedback>,
}

impl CandidateRecord {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            candidate,
            evidence: Vec::new(),
            score_card: None,
            outreach: None,
            outcome_events: Vec::new(),
            feedback: None,
        }
    }

    pub fn id(&self) -> &CandidateId {
        &self.candidate.id
    }

    /// False when there is nothing at all to evaluate: no website, notes, extra data or links.
    pub fn has_information(&self) -> bool {
        self.candidate.website.is_some()
            || self.has_notes()
            || !self.candidate.custom_data.is_empty()
            || !self.evidence.is_empty()
    }

    fn has_notes(&self) -> bool {
        self.candidate
            .notes
            .as_deref()
            .is_some_and(|notes| !notes.trim().is_empty())
    }

    /// Summarised bullets across all links, in link order, capped for the judgment request.
    pub fn evidence_refs(&self) -> Vec<EvidenceRef> {
        self.evidence
            .iter()
            .flat_map(|link| {
                link.bullets.iter().map(|bullet| EvidenceRef {
                    text: bullet.text.clone(),
                    url: link.url.clone(),
                })
            })
            .take(MAX_EVIDENCE_BULLETS)
            .collect()
    }

    /// Evidence bullets, notes or extra data all count.
    pub fn has_evidence(&self) -> bool {
        self.evidence.iter().any(|link| !link.bullets.is_empty())
            || !self.candidate.custom_data.is_empty()
            || self.has_notes()
    }

    pub fn tier(&self) -> Option<Tier> {
        self.score_card.as_ref().map(|card| card.tier)
    }

    pub fn total_score(&self) -> Option<f64> {
        self.score_card.as_ref().map(|card| card.total_score)
    }
}

/// Storage abstraction so the service can be exercised in isolation.
///
/// Candidate listings come back in creation order.
pub trait ProjectRepository: Send + Sync {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError>;
    fn update_project(&self, project: Project) -> Result<(), RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError>;

    fn insert_candidate(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError>;
    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError>;
    fn candidates_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<CandidateRecord>, RepositoryError>;
    /// Remove the listed candidates that belong to the project; returns how many were removed.
    fn delete_candidates(
        &self,
        project_id: &ProjectId,
        ids: &[CandidateId],
    ) -> Result<usize, RepositoryError>;
    fn clear_candidates(&self, project_id: &ProjectId) -> Result<usize, RepositoryError>;
    /// Overwrite only the tier of an existing score card.
    fn set_tier(&self, id: &CandidateId, tier: Tier) -> Result<(), RepositoryError>;
    fn set_score_card(&self, id: &CandidateId, card: ScoreCard) -> Result<(), RepositoryError>;
    fn push_evidence(&self, id: &CandidateId, link: EvidenceLink) -> Result<(), RepositoryError>;
    /// Store the draft and append its outcome event in one write.
    fn record_outreach(
        &self,
        id: &CandidateId,
        draft: OutreachDraft,
        event: OutcomeEvent,
    ) -> Result<(), RepositoryError>;
    fn set_feedback(&self, id: &CandidateId, feedback: CandidateFeedback) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
