use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::workflows::partners::domain::{
    CandidateFeedback, CandidateId, EvidenceLink, NewCandidate, NewProject, OutcomeEvent,
    OutreachDraft, Project, ProjectBrief, ProjectId,
};
use crate::workflows::partners::judgment::{
    baseline_judgment, CannedJudgmentSource, RawCriterionScores, RawJudgment,
    ScriptedAssessment,
};
use crate::workflows::partners::repository::{CandidateRecord, ProjectRepository, RepositoryError};
use crate::workflows::partners::scoring::{ScoreCard, Tier};
use crate::workflows::partners::{partner_router, PartnerDiscoveryService};

pub(super) type MemoryService = PartnerDiscoveryService<MemoryRepository, CannedJudgmentSource>;

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig {
        call_delay: Duration::ZERO,
        ..ScoringConfig::default()
    }
}

pub(super) fn build_service_with(
    judgment: CannedJudgmentSource,
) -> (MemoryService, Arc<MemoryRepository>, Arc<CannedJudgmentSource>) {
    let repository = Arc::new(MemoryRepository::default());
    let judgment = Arc::new(judgment);
    let service =
        PartnerDiscoveryService::new(repository.clone(), judgment.clone(), &scoring_config());
    (service, repository, judgment)
}

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>, Arc<CannedJudgmentSource>)
{
    build_service_with(CannedJudgmentSource::default())
}

pub(super) fn anchor_brief() -> ProjectBrief {
    ProjectBrief {
        brand_category: Some("Premium outdoor lifestyle".to_string()),
        product_type_sought: Some("Home goods, drinkware, textiles".to_string()),
        price_range: Some("Premium".to_string()),
        distribution_preference: Some("Specialty retail first".to_string()),
        geography: Some("North America".to_string()),
        positioning_keywords: Some("durable, design-led".to_string()),
        constraints: None,
    }
}

pub(super) fn anchor_project(service: &MemoryService) -> Project {
    service
        .create_project(NewProject {
            name: Some("Anchor Scenario".to_string()),
            brief: anchor_brief(),
            exclude_list: Some("Yeti\nStanley 1913".to_string()),
        })
        .expect("project created")
}

pub(super) fn add_named(service: &MemoryService, project_id: &ProjectId, name: &str) -> CandidateId {
    service
        .add_candidate(
            project_id,
            NewCandidate {
                name: name.to_string(),
                website: Some(format!("{}.example", name.to_lowercase().replace(' ', ""))),
                notes: None,
            },
        )
        .expect("candidate added")
        .expect("candidate kept")
        .candidate
        .id
}

/// Judgment with every criterion at `score` and the given disqualifiers.
pub(super) fn judgment_with(score: i64, disqualifiers: &[&str]) -> ScriptedAssessment {
    ScriptedAssessment::Judgment(RawJudgment {
        criterion_scores: Some(RawCriterionScores::uniform(score)),
        disqualifiers: disqualifiers.iter().map(|label| label.to_string()).collect(),
        ..baseline_judgment()
    })
}

pub(super) fn tier_of(repository: &MemoryRepository, id: &CandidateId) -> Option<Tier> {
    repository
        .fetch_candidate(id)
        .expect("fetch succeeds")
        .and_then(|record| record.tier())
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) projects: Arc<Mutex<HashMap<ProjectId, Project>>>,
    pub(super) candidates: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl ProjectRepository for MemoryRepository {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.projects.lock().expect("repository mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: Project) -> Result<(), RepositoryError> {
        let mut guard = self.projects.lock().expect("repository mutex poisoned");
        guard.insert(project.id.clone(), project);
        Ok(())
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.projects.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.projects.lock().expect("repository mutex poisoned");
        let mut projects: Vec<Project> = guard.values().cloned().collect();
        projects.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(projects)
    }

    fn insert_candidate(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.candidates.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id() == record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        let guard = self.candidates.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| record.id() == id).cloned())
    }

    fn candidates_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<CandidateRecord>, RepositoryError> {
        let guard = self.candidates.lock().expect("repository mutex poisoned");
        Ok(guard
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
        let mut guard = self.candidates.lock().expect("repository mutex poisoned");
        let before = guard.len();
        guard.retain(|record| {
            &record.candidate.project_id != project_id || !ids.contains(record.id())
        });
        Ok(before - guard.len())
    }

    fn clear_candidates(&self, project_id: &ProjectId) -> Result<usize, RepositoryError> {
        let mut guard = self.candidates.lock().expect("repository mutex poisoned");
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

impl MemoryRepository {
    fn with_candidate<T>(
        &self,
        id: &CandidateId,
        change: impl FnOnce(&mut CandidateRecord) -> T,
    ) -> Result<T, RepositoryError> {
        let mut guard = self.candidates.lock().expect("repository mutex poisoned");
        guard
            .iter_mut()
            .find(|record| record.id() == id)
            .map(change)
            .ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl ProjectRepository for UnavailableRepository {
    fn insert_project(&self, _project: Project) -> Result<Project, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_project(&self, _project: Project) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_project(&self, _id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_candidate(&self, _record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_candidate(&self, _id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn candidates_for_project(
        &self,
        _project_id: &ProjectId,
    ) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_candidates(
        &self,
        _project_id: &ProjectId,
        _ids: &[CandidateId],
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn clear_candidates(&self, _project_id: &ProjectId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_tier(&self, _id: &CandidateId, _tier: Tier) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_score_card(&self, _id: &CandidateId, _card: ScoreCard) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn push_evidence(&self, _id: &CandidateId, _link: EvidenceLink) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_outreach(
        &self,
        _id: &CandidateId,
        _draft: OutreachDraft,
        _event: OutcomeEvent,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_feedback(
        &self,
        _id: &CandidateId,
        _feedback: CandidateFeedback,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 256)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 256)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) fn partner_router_with_service(service: MemoryService) -> axum::Router {
    partner_router(Arc::new(service))
}
