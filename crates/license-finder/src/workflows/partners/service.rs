use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;

use super::domain::{
    non_blank, Candidate, CandidateFeedback, CandidateFeedbackInput, CandidateId, EvidenceBullet,
    EvidenceLink, EvidenceLinkId, NewCandidate, NewEvidenceLink, NewProject, OutcomeEvent,
    OutcomeStatus, OutreachDraft, Project, ProjectFeedback, ProjectFeedbackInput, ProjectId,
    Provenance, TonePreset, DEFAULT_PROJECT_NAME, MAX_CANDIDATE_NAME_CHARS,
    MAX_CANDIDATE_NOTES_CHARS, MAX_EVIDENCE_EXCERPT_CHARS, MAX_PROJECT_NAME_CHARS,
};
use super::judgment::{
    validate_judgment, validate_outreach, AssessmentRequest, Judgment, JudgmentError,
    JudgmentSource, JudgmentValidationError, OutreachRequest,
};
use super::repository::{CandidateRecord, ProjectRepository, RepositoryError};
use super::results::ProjectResults;
use super::roster::{
    export_filename, export_rows, parse_roster, render_csv, RosterImportError, MAX_ROSTER_ROWS,
};
use super::sanitize::{
    is_excluded, is_visibly_blank, normalize_url, parse_exclude_list, truncate_chars,
};
use super::scoring::{tier_buckets, ScoreCard, ScoringEngine, Tier, TierCandidate};

/// Orchestrates projects, candidates, scoring batches and outreach over a repository and a
/// judgment source.
pub struct PartnerDiscoveryService<R, J> {
    repository: Arc<R>,
    judgment: Arc<J>,
    engine: Arc<ScoringEngine>,
    call_delay: Duration,
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CANDIDATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EVIDENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    let id = PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProjectId(format!("{id:06}"))
}

fn next_candidate_id() -> CandidateId {
    let id = CANDIDATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CandidateId(format!("cand-{id:06}"))
}

fn next_evidence_id() -> EvidenceLinkId {
    let id = EVIDENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvidenceLinkId(format!("ev-{id:06}"))
}

/// A project with its candidates in creation order.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectOverview {
    pub project: Project,
    pub candidates: Vec<CandidateRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCandidate {
    pub candidate_id: CandidateId,
    pub reason: String,
}

/// Outcome of one scoring batch, including the project-wide tiers written afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoringRunSummary {
    pub scored: Vec<CandidateId>,
    pub short_circuited: Vec<CandidateId>,
    pub failed: Vec<FailedCandidate>,
    pub tiers: BTreeMap<CandidateId, Tier>,
}

impl ScoringRunSummary {
    pub fn tier_count(&self, tier: Tier) -> usize {
        self.tiers.values().filter(|assigned| **assigned == tier).count()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RosterImportSummary {
    pub imported: Vec<CandidateId>,
    pub excluded: Vec<String>,
    pub evidence_links: usize,
    /// Rows past the per-upload limit that were not read.
    pub skipped_over_limit: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutreachRunSummary {
    pub drafted: Vec<CandidateId>,
    pub failed: Vec<FailedCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub body: String,
}

impl<R, J> PartnerDiscoveryService<R, J>
where
    R: ProjectRepository + 'static,
    J: JudgmentSource + 'static,
{
    pub fn new(repository: Arc<R>, judgment: Arc<J>, config: &ScoringConfig) -> Self {
        Self {
            repository,
            judgment,
            engine: Arc::new(ScoringEngine::new(config.weights)),
            call_delay: config.call_delay,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn create_project(&self, input: NewProject) -> Result<Project, DiscoveryServiceError> {
        let now = Utc::now();
        let project = Project {
            id: next_project_id(),
            name: project_name(input.name),
            brief: input.brief.normalized(),
            exclude_list: non_blank(input.exclude_list),
            feedback: None,
            created_at: now,
            updated_at: now,
        };
        let stored = self.repository.insert_project(project)?;
        info!(project_id = %stored.id.0, name = %stored.name, "project created");
        Ok(stored)
    }

    /// Replace name, brief and exclude list. Existing candidates are not re-filtered.
    pub fn update_project(
        &self,
        project_id: &ProjectId,
        input: NewProject,
    ) -> Result<Project, DiscoveryServiceError> {
        let mut project = self.get_project(project_id)?;
        project.name = project_name(input.name);
        project.brief = input.brief.normalized();
        project.exclude_list = non_blank(input.exclude_list);
        project.updated_at = Utc::now();
        self.repository.update_project(project.clone())?;
        Ok(project)
    }

    pub fn get_project(&self, project_id: &ProjectId) -> Result<Project, DiscoveryServiceError> {
        self.repository
            .fetch_project(project_id)?
            .ok_or_else(|| DiscoveryServiceError::ProjectNotFound {
                project_id: project_id.clone(),
            })
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, DiscoveryServiceError> {
        Ok(self.repository.list_projects()?)
    }

    pub fn project_overview(
        &self,
        project_id: &ProjectId,
    ) -> Result<ProjectOverview, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        let candidates = self.repository.candidates_for_project(project_id)?;
        Ok(ProjectOverview {
            project,
            candidates,
        })
    }

    fn get_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<CandidateRecord, DiscoveryServiceError> {
        self.repository
            .fetch_candidate(candidate_id)?
            .ok_or_else(|| DiscoveryServiceError::CandidateNotFound {
                candidate_id: candidate_id.clone(),
            })
    }

    /// Add a candidate by hand. Blank or excluded names are skipped and yield `None`.
    pub fn add_candidate(
        &self,
        project_id: &ProjectId,
        input: NewCandidate,
    ) -> Result<Option<CandidateRecord>, DiscoveryServiceError> {
        self.add_candidate_with_provenance(project_id, input, Provenance::Manual)
    }

    pub fn add_candidate_with_provenance(
        &self,
        project_id: &ProjectId,
        input: NewCandidate,
        provenance: Provenance,
    ) -> Result<Option<CandidateRecord>, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        let exclude = parse_exclude_list(project.exclude_list.as_deref());
        self.insert_candidate(&project, &exclude, input, BTreeMap::new(), provenance)
    }

    fn insert_candidate(
        &self,
        project: &Project,
        exclude: &[String],
        input: NewCandidate,
        custom_data: BTreeMap<String, String>,
        provenance: Provenance,
    ) -> Result<Option<CandidateRecord>, DiscoveryServiceError> {
        let name = input.name.trim();
        if is_visibly_blank(name) {
            debug!(project_id = %project.id.0, "skipping candidate with blank name");
            return Ok(None);
        }
        if is_excluded(name, exclude) {
            info!(project_id = %project.id.0, candidate = name, "candidate on exclude list; skipped");
            return Ok(None);
        }

        let candidate = Candidate {
            id: next_candidate_id(),
            project_id: project.id.clone(),
            name: truncate_chars(name, MAX_CANDIDATE_NAME_CHARS),
            website: input.website.as_deref().and_then(normalize_url),
            notes: non_blank(input.notes)
                .map(|notes| truncate_chars(&notes, MAX_CANDIDATE_NOTES_CHARS)),
            custom_data,
            provenance,
            created_at: Utc::now(),
        };
        let stored = self
            .repository
            .insert_candidate(CandidateRecord::new(candidate))?;
        debug!(project_id = %project.id.0, candidate_id = %stored.id().0, "candidate added");
        Ok(Some(stored))
    }

    /// Import a roster CSV: at most [`MAX_ROSTER_ROWS`] rows, provenance `uploaded`, website and
    /// links attached as evidence links.
    pub fn import_roster<Rd: Read>(
        &self,
        project_id: &ProjectId,
        reader: Rd,
    ) -> Result<RosterImportSummary, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        let exclude = parse_exclude_list(project.exclude_list.as_deref());
        let rows = parse_roster(reader)?;

        let mut summary = RosterImportSummary {
            skipped_over_limit: rows.len().saturating_sub(MAX_ROSTER_ROWS),
            ..RosterImportSummary::default()
        };

        for row in rows.into_iter().take(MAX_ROSTER_ROWS) {
            let evidence_urls = row.evidence_urls();
            let input = NewCandidate {
                name: row.name.clone(),
                website: row.website.clone(),
                notes: row.notes.clone(),
            };
            let Some(record) =
                self.insert_candidate(&project, &exclude, input, row.custom_data, Provenance::Uploaded)?
            else {
                summary.excluded.push(row.name);
                continue;
            };

            let now = Utc::now();
            for url in evidence_urls {
                let link = EvidenceLink {
                    id: next_evidence_id(),
                    url,
                    excerpt: None,
                    bullets: Vec::new(),
                    created_at: now,
                };
                self.repository.push_evidence(record.id(), link)?;
                summary.evidence_links += 1;
            }
            summary.imported.push(record.candidate.id);
        }

        info!(
            project_id = %project_id.0,
            imported = summary.imported.len(),
            excluded = summary.excluded.len(),
            evidence_links = summary.evidence_links,
            "roster imported"
        );
        Ok(summary)
    }

    pub fn add_evidence(
        &self,
        candidate_id: &CandidateId,
        input: NewEvidenceLink,
    ) -> Result<EvidenceLink, DiscoveryServiceError> {
        let url = normalize_url(&input.url)
            .ok_or_else(|| DiscoveryServiceError::InvalidUrl(input.url.clone()))?;
        self.get_candidate(candidate_id)?;

        let link = EvidenceLink {
            id: next_evidence_id(),
            url,
            excerpt: non_blank(input.excerpt)
                .map(|excerpt| truncate_chars(&excerpt, MAX_EVIDENCE_EXCERPT_CHARS)),
            bullets: input
                .bullets
                .into_iter()
                .filter_map(|bullet| {
                    let text = bullet.text.trim();
                    (!text.is_empty()).then(|| EvidenceBullet {
                        text: text.to_string(),
                        support_type: bullet.support_type,
                    })
                })
                .collect(),
            created_at: Utc::now(),
        };
        self.repository
            .push_evidence(candidate_id, link.clone())
            .map_err(|err| missing_candidate(err, candidate_id))?;
        debug!(candidate_id = %candidate_id.0, url = %link.url, "evidence link added");
        Ok(link)
    }

    pub fn delete_candidate(&self, candidate_id: &CandidateId) -> Result<(), DiscoveryServiceError> {
        let record = self.get_candidate(candidate_id)?;
        let project_id = record.candidate.project_id;
        self.repository
            .delete_candidates(&project_id, std::slice::from_ref(candidate_id))?;
        self.retier_project(&project_id)?;
        Ok(())
    }

    pub fn delete_candidates(
        &self,
        project_id: &ProjectId,
        candidate_ids: &[CandidateId],
    ) -> Result<usize, DiscoveryServiceError> {
        self.get_project(project_id)?;
        if candidate_ids.is_empty() {
            return Ok(0);
        }
        let removed = self.repository.delete_candidates(project_id, candidate_ids)?;
        self.retier_project(project_id)?;
        info!(project_id = %project_id.0, removed, "candidates deleted");
        Ok(removed)
    }

    pub fn clear_candidates(&self, project_id: &ProjectId) -> Result<usize, DiscoveryServiceError> {
        self.get_project(project_id)?;
        let removed = self.repository.clear_candidates(project_id)?;
        info!(project_id = %project_id.0, removed, "project cleared");
        Ok(removed)
    }

    /// Score every candidate in creation order, then re-tier the project.
    pub fn score_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<ScoringRunSummary, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        let snapshot = self.repository.candidates_for_project(project_id)?;
        self.run_scoring_batch(&project, snapshot)
    }

    /// Score the listed candidates of the project, then re-tier the whole project.
    ///
    /// Ids outside the project are ignored.
    pub fn score_candidates(
        &self,
        project_id: &ProjectId,
        candidate_ids: &[CandidateId],
    ) -> Result<ScoringRunSummary, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        if candidate_ids.is_empty() {
            return Ok(ScoringRunSummary::default());
        }
        let wanted: BTreeSet<&CandidateId> = candidate_ids.iter().collect();
        let snapshot = self
            .repository
            .candidates_for_project(project_id)?
            .into_iter()
            .filter(|record| wanted.contains(record.id()))
            .collect();
        self.run_scoring_batch(&project, snapshot)
    }

    fn run_scoring_batch(
        &self,
        project: &Project,
        snapshot: Vec<CandidateRecord>,
    ) -> Result<ScoringRunSummary, DiscoveryServiceError> {
        let mut summary = ScoringRunSummary::default();
        let mut external_calls = 0usize;

        info!(project_id = %project.id.0, candidates = snapshot.len(), "scoring batch started");

        for record in snapshot {
            let candidate_id = record.id().clone();

            if !record.has_information() {
                self.store_card(&candidate_id, self.engine.no_information_card())?;
                debug!(candidate_id = %candidate_id.0, "no information; short-circuited");
                summary.short_circuited.push(candidate_id);
                continue;
            }

            if external_calls > 0 {
                self.pause();
            }
            external_calls += 1;

            match self.assess(project, &record) {
                Ok(judgment) => {
                    let card = self.engine.score_card(judgment, record.has_evidence());
                    info!(
                        candidate_id = %candidate_id.0,
                        total_score = card.total_score,
                        confidence = card.confidence.label(),
                        "candidate scored"
                    );
                    self.store_card(&candidate_id, card)?;
                    summary.scored.push(candidate_id);
                }
                Err(err) => {
                    warn!(candidate_id = %candidate_id.0, error = %err, "scoring failed; keeping previous card");
                    summary.failed.push(FailedCandidate {
                        candidate_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        summary.tiers = self.retier_project(&project.id)?;
        info!(
            project_id = %project.id.0,
            scored = summary.scored.len(),
            short_circuited = summary.short_circuited.len(),
            failed = summary.failed.len(),
            "scoring batch finished"
        );
        Ok(summary)
    }

    fn assess(
        &self,
        project: &Project,
        record: &CandidateRecord,
    ) -> Result<Judgment, DiscoveryServiceError> {
        let request = AssessmentRequest {
            brief: project.brief.clone(),
            candidate_name: record.candidate.name.clone(),
            website: record.candidate.website.clone(),
            notes: record.candidate.notes.clone(),
            custom_data: record.candidate.custom_data.clone(),
            evidence: record.evidence_refs(),
        };
        let raw = self.judgment.assess(&request)?;
        Ok(validate_judgment(raw)?)
    }

    /// Write only the card; a candidate deleted mid-batch is skipped.
    fn store_card(
        &self,
        candidate_id: &CandidateId,
        card: ScoreCard,
    ) -> Result<(), DiscoveryServiceError> {
        match self.repository.set_score_card(candidate_id, card) {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => {
                warn!(candidate_id = %candidate_id.0, "candidate removed during scoring");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn pause(&self) {
        if !self.call_delay.is_zero() {
            thread::sleep(self.call_delay);
        }
    }

    /// Recompute tiers over one snapshot of every scored candidate in the project.
    pub fn retier_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<BTreeMap<CandidateId, Tier>, DiscoveryServiceError> {
        let inputs: Vec<TierCandidate> = self
            .repository
            .candidates_for_project(project_id)?
            .into_iter()
            .filter_map(|record| {
                let card = record.score_card?;
                Some(TierCandidate {
                    candidate_id: record.candidate.id,
                    total_score: card.total_score,
                    disqualifiers: card.disqualifiers,
                })
            })
            .collect();

        let tiers = tier_buckets(&inputs);
        for (candidate_id, tier) in &tiers {
            self.repository.set_tier(candidate_id, *tier)?;
        }
        debug!(project_id = %project_id.0, tiered = tiers.len(), "project re-tiered");
        Ok(tiers)
    }

    pub fn results(&self, project_id: &ProjectId) -> Result<ProjectResults, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        let records = self.repository.candidates_for_project(project_id)?;
        Ok(ProjectResults::from_records(project, records))
    }

    pub fn export_csv(&self, project_id: &ProjectId) -> Result<ExportFile, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        let records = self.repository.candidates_for_project(project_id)?;
        let body = render_csv(&export_rows(&records))?;
        Ok(ExportFile {
            filename: export_filename(&project),
            body,
        })
    }

    /// Draft outreach for every tier-A candidate, paced like scoring. Failures are collected.
    pub fn draft_outreach_for_tier_a(
        &self,
        project_id: &ProjectId,
    ) -> Result<OutreachRunSummary, DiscoveryServiceError> {
        let project = self.get_project(project_id)?;
        let tier_a: Vec<CandidateRecord> = self
            .repository
            .candidates_for_project(project_id)?
            .into_iter()
            .filter(|record| record.tier() == Some(Tier::A))
            .collect();

        let mut summary = OutreachRunSummary::default();
        for (index, record) in tier_a.into_iter().enumerate() {
            if index > 0 {
                self.pause();
            }
            let candidate_id = record.id().clone();
            match self.draft_for(&project, record) {
                Ok(_) => summary.drafted.push(candidate_id),
                Err(err) => {
                    warn!(candidate_id = %candidate_id.0, error = %err, "outreach draft failed");
                    summary.failed.push(FailedCandidate {
                        candidate_id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(summary)
    }

    pub fn draft_outreach(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<OutreachDraft, DiscoveryServiceError> {
        let record = self.get_candidate(candidate_id)?;
        let project = self.get_project(&record.candidate.project_id)?;
        self.draft_for(&project, record)
    }

    fn draft_for(
        &self,
        project: &Project,
        record: CandidateRecord,
    ) -> Result<OutreachDraft, DiscoveryServiceError> {
        let card = record
            .score_card
            .as_ref()
            .ok_or_else(|| DiscoveryServiceError::NotScored {
                candidate_id: record.id().clone(),
            })?;

        let request = OutreachRequest {
            brief: project.brief.clone(),
            candidate_name: record.candidate.name.clone(),
            website: record.candidate.website.clone(),
            proof_points: card.proof_points.clone(),
        };
        let copy = validate_outreach(self.judgment.draft_outreach(&request)?)?;

        let now = Utc::now();
        let draft = OutreachDraft {
            tone_preset: TonePreset::WarmProfessional,
            subject: copy.subject,
            body: copy.body,
            drafted_at: now,
        };

        let event = OutcomeEvent {
            status: OutcomeStatus::OutreachDrafted,
            recorded_at: now,
        };
        self.repository
            .record_outreach(record.id(), draft.clone(), event)
            .map_err(|err| missing_candidate(err, record.id()))?;
        info!(candidate_id = %record.id().0, "outreach drafted");
        Ok(draft)
    }

    pub fn save_project_feedback(
        &self,
        project_id: &ProjectId,
        input: ProjectFeedbackInput,
    ) -> Result<ProjectFeedback, DiscoveryServiceError> {
        if let Some(rating) = input.rating.filter(|rating| !(1..=5).contains(rating)) {
            return Err(DiscoveryServiceError::InvalidRating(rating));
        }
        let mut project = self.get_project(project_id)?;
        let feedback = ProjectFeedback {
            rating: input.rating,
            notes: non_blank(input.notes),
            updated_at: Utc::now(),
        };
        project.feedback = Some(feedback.clone());
        self.repository.update_project(project)?;
        Ok(feedback)
    }

    pub fn save_candidate_feedback(
        &self,
        candidate_id: &CandidateId,
        input: CandidateFeedbackInput,
    ) -> Result<CandidateFeedback, DiscoveryServiceError> {
        let feedback = CandidateFeedback {
            misfit: input.misfit,
            reason: non_blank(input.reason),
            updated_at: Utc::now(),
        };
        self.repository
            .set_feedback(candidate_id, feedback.clone())
            .map_err(|err| missing_candidate(err, candidate_id))?;
        Ok(feedback)
    }
}

fn missing_candidate(err: RepositoryError, candidate_id: &CandidateId) -> DiscoveryServiceError {
    match err {
        RepositoryError::NotFound => DiscoveryServiceError::CandidateNotFound {
            candidate_id: candidate_id.clone(),
        },
        other => other.into(),
    }
}

fn project_name(name: Option<String>) -> String {
    non_blank(name)
        .map(|name| truncate_chars(&name, MAX_PROJECT_NAME_CHARS))
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
}

/// Error raised by the discovery service.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryServiceError {
    #[error("project {} not found", project_id.0)]
    ProjectNotFound { project_id: ProjectId },
    #[error("candidate {} not found", candidate_id.0)]
    CandidateNotFound { candidate_id: CandidateId },
    #[error("candidate {} has not been scored", candidate_id.0)]
    NotScored { candidate_id: CandidateId },
    #[error("invalid url `{0}`")]
    InvalidUrl(String),
    #[error("rating must be between 1 and 5 (got {0})")]
    InvalidRating(u8),
    #[error(transparent)]
    Roster(#[from] RosterImportError),
    #[error(transparent)]
    Judgment(#[from] JudgmentError),
    #[error("judgment rejected: {0}")]
    Validation(#[from] JudgmentValidationError),
    #[error("failed to render export: {0}")]
    Export(#[from] csv::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
