use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::validation::{RawCriterionScores, RawJudgment, RawOutreachDraft, RawProofPoint};
use super::{AssessmentRequest, JudgmentError, JudgmentSource, OutreachRequest};

/// Scripted response for one candidate name.
#[derive(Debug, Clone)]
pub enum ScriptedAssessment {
    Judgment(RawJudgment),
    Failure(String),
}

/// Deterministic judgments for offline runs and tests.
///
/// Every candidate receives the same baseline assessment unless a script is registered for its
/// name (case-insensitive).
#[derive(Debug)]
pub struct CannedJudgmentSource {
    baseline: RawJudgment,
    scripts: BTreeMap<String, ScriptedAssessment>,
    outreach: RawOutreachDraft,
    assessments: AtomicUsize,
    drafts: AtomicUsize,
}

impl Default for CannedJudgmentSource {
    fn default() -> Self {
        Self::new(baseline_judgment())
    }
}

impl CannedJudgmentSource {
    pub fn new(baseline: RawJudgment) -> Self {
        Self {
            baseline,
            scripts: BTreeMap::new(),
            outreach: baseline_outreach(),
            assessments: AtomicUsize::new(0),
            drafts: AtomicUsize::new(0),
        }
    }

    pub fn with_script(mut self, candidate_name: &str, script: ScriptedAssessment) -> Self {
        self.scripts
            .insert(candidate_name.trim().to_lowercase(), script);
        self
    }

    pub fn with_outreach(mut self, outreach: RawOutreachDraft) -> Self {
        self.outreach = outreach;
        self
    }

    /// Number of `assess` calls served so far.
    pub fn assessments(&self) -> usize {
        self.assessments.load(Ordering::Relaxed)
    }

    pub fn drafts(&self) -> usize {
        self.drafts.load(Ordering::Relaxed)
    }
}

impl JudgmentSource for CannedJudgmentSource {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawJudgment, JudgmentError> {
        self.assessments.fetch_add(1, Ordering::Relaxed);
        match self.scripts.get(&request.candidate_name.trim().to_lowercase()) {
            Some(ScriptedAssessment::Judgment(judgment)) => Ok(judgment.clone()),
            Some(ScriptedAssessment::Failure(reason)) => {
                Err(JudgmentError::Unavailable(reason.clone()))
            }
            None => Ok(self.baseline.clone()),
        }
    }

    fn draft_outreach(&self, _request: &OutreachRequest) -> Result<RawOutreachDraft, JudgmentError> {
        self.drafts.fetch_add(1, Ordering::Relaxed);
        Ok(self.outreach.clone())
    }
}

/// Baseline: solid adjacency, no disqualifiers, unverified proof points.
pub fn baseline_judgment() -> RawJudgment {
    RawJudgment {
        criterion_scores: Some(RawCriterionScores {
            category_fit: Some(4),
            distribution_alignment: Some(4),
            licensing_activity: Some(3),
            scale_appropriateness: Some(3),
            quality_reputation: Some(4),
            geo_coverage: Some(4),
            recent_momentum: Some(3),
            manufacturing_capability: Some(4),
        }),
        disqualifiers: Vec::new(),
        flags: vec![
            "Verify specialty retail mix".to_string(),
            "Confirm openness to third-party licensing".to_string(),
        ],
        rationale_bullets: vec![
            "Strong adjacency: premium drinkware and outdoor entertaining align with the requested home goods expansion".to_string(),
            "Brand and product systems likely meet the requested price band (verify SKU-level pricing)".to_string(),
            "Distribution appears compatible with specialty outdoor and boutique channels (verify channel mix)".to_string(),
            "Manufacturing capability likely supports hardgoods and accessories with quality expectations".to_string(),
        ],
        proof_points: vec![
            RawProofPoint {
                text: "Look for partnerships, collaborations or licensing mentions on press pages".to_string(),
                support_type: Some("to_verify".to_string()),
                url: None,
            },
            RawProofPoint {
                text: "Confirm presence in specialty outdoor retailers via store locators or wholesale pages".to_string(),
                support_type: Some("to_verify".to_string()),
                url: None,
            },
        ],
        confidence: Some("Medium".to_string()),
        next_step: Some(
            "Warm intro through a mutual connection, otherwise targeted outreach to the licensing or partnerships lead"
                .to_string(),
        ),
    }
}

fn baseline_outreach() -> RawOutreachDraft {
    RawOutreachDraft {
        subject: "Exploring a premium outdoor-home goods licensing fit".to_string(),
        body: "Hi [Name],\n\nI run licensing strategy for a premium outdoor lifestyle brand expanding into home goods, with a specialty-first channel focus.\n\nYour team's product and brand positioning looks like a strong adjacency for a selective licensing partnership. [PLACEHOLDER: insert 1-2 concrete proof points once verified].\n\nWould you be open to a short exploratory call to see if there is a mutual fit?\n\nBest,\n[Your Name]".to_string(),
    }
}
