use license_finder::config::JudgmentConfig;
use license_finder::workflows::partners::scoring::{ScoreCard, Tier};
use license_finder::workflows::partners::{
    AssessmentRequest, CandidateFeedback, CandidateId, CandidateRecord, CannedJudgmentSource,
    EvidenceLink, JudgmentError, JudgmentSource, OpenAiJudgmentSource, OutcomeEvent,
    OutreachDraft, OutreachRequest, Project, ProjectId, ProjectRepository, RawJudgment,
    RawOutreachDraft, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store; candidates are kept in insertion order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProjectRepository {
    projects: Arc<Mutex<BTreeMap<ProjectId, Project>>>,
    candidates: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl InMemoryProjectRepository {
    /// Apply `change` to the stored record under the lock.
    fn with_candidate<T>(
        &self,
        id: &CandidateId,
        change: impl FnOnce(&mut CandidateRecord) -> T,
    ) -> Result<T, RepositoryError> {
        let mut guard = lock(&self.candidates)?;
        guard
            .iter_mut()
            .find(|record| record.id() == id)
            .map(change)
            .ok_or(RepositoryError::NotFound)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = lock(&self.projects)?;
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: Project) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.projects)?;
        match guard.get_mut(&project.id) {
            Some(existing) => {
                *existing = project;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(lock(&self.projects)?.get(id).cloned())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        let mut projects: Vec<Project> = lock(&self.projects)?.values().cloned().collect();
        projects.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(projects)
    }

    fn insert_candidate(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = lock(&self.candidates)?;
        if guard.iter().any(|existing| existing.id() == record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Ok(lock(&self.candidates)?
            .iter()
            .find(|record| record.id() == id)
            .cloned())
    }

    fn candidates_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(lock(&self.candidates)?
            .iter()
            .filter(|record| &record.candidate.project_id == project_id)
            .cloned()
            .collect())
    }

    fn delete_candidates(
        &self,
        project_id: &ProjectId,
        ids: &[CandidateId],
    ) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.candidates)?;
        let before = guard.len();
        guard.retain(|record| {
            &record.candidate.project_id != project_id || !ids.contains(record.id())
        });
        Ok(before - guard.len())
    }

    fn clear_candidates(&self, project_id: &ProjectId) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.candidates)?;
        let before = guard.len();
        guard.retain(|record| &record.candidate.project_id != project_id);
        Ok(before - guard.len())
    }

    fn set_tier(&self, id: &CandidateId, tier: Tier) -> Result<(), RepositoryError> {
        self.with_candidate(id, |record| {
            record
                .score_card
                .as_mut()
                .map(|card| card.tier = tier)
                .ok_or(RepositoryError::NotFound)
        })?
    }

    fn set_score_card(&self, id: &CandidateId, card: ScoreCard) -> Result<(), RepositoryError> {
        self.with_candidate(id, |record| record.score_card = Some(card))
    }

    fn push_evidence(&self, id: &CandidateId, link: EvidenceLink) -> Result<(), RepositoryError> {
        self.with_candidate(id, |record| record.evidence.push(link))
    }

    fn record_outreach(
        &self,
        id: &CandidateId,
        draft: OutreachDraft,
        event: OutcomeEvent,
    ) -> Result<(), RepositoryError> {
        self.with_candidate(id, |record| {
            record.outreach = Some(draft);
            record.outcome_events.push(event);
        })
    }

    fn set_feedback(&self, id: &CandidateId, feedback: CandidateFeedback) -> Result<(), RepositoryError> {
        self.with_candidate(id, |record| record.feedback = Some(feedback))
    }
}

/// Judgment backend chosen at startup.
pub(crate) enum ConfiguredJudgment {
    Live(OpenAiJudgmentSource),
    Canned(CannedJudgmentSource),
}

impl JudgmentSource for ConfiguredJudgment {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawJudgment, JudgmentError> {
        match self {
            Self::Live(source) => source.assess(request),
            Self::Canned(source) => source.assess(request),
        }
    }

    fn draft_outreach(&self, request: &OutreachRequest) -> Result<RawOutreachDraft, JudgmentError> {
        match self {
            Self::Live(source) => source.draft_outreach(request),
            Self::Canned(source) => source.draft_outreach(request),
        }
    }
}

pub(crate) fn build_judgment_source(config: &JudgmentConfig) -> ConfiguredJudgment {
    let live = config
        .uses_live_backend()
        .then(|| OpenAiJudgmentSource::from_config(config))
        .flatten();
    match live {
        Some(source) => {
            info!(model = %config.model, "using live judgment backend");
            ConfiguredJudgment::Live(source)
        }
        None => {
            info!(provider = ?config.provider, "using canned judgments");
            ConfiguredJudgment::Canned(CannedJudgmentSource::default())
        }
    }
}
