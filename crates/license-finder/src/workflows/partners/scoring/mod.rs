//! Deterministic post-processing over structured judgments: composite score and tiers.

mod card;
mod composite;
pub mod disqualifiers;
mod tiering;
mod weights;

use chrono::Utc;

use super::judgment::Judgment;
use super::sanitize::redact;

pub use card::{Confidence, ProofPoint, ScoreCard, SupportType, Tier};
pub use composite::{compute_total_score, enforce_confidence};
pub use disqualifiers::{
    is_category_disqualifier, is_distribution_disqualifier, is_hard_disqualifier,
    NO_INFORMATION_DISQUALIFIER,
};
pub use tiering::{
    adjusted_score, tier_buckets, TierCandidate, TIER_A_TARGET, TIER_B_TARGET,
};
pub use weights::{Criterion, CriterionScores, Weights, DEFAULT_WEIGHTS, MAX_CRITERION_SCORE};

pub const NO_INFORMATION_RATIONALE: &str = "No information available to evaluate this candidate.";
pub const NO_INFORMATION_NEXT_STEP: &str =
    "Provide a website, notes, or evidence links before scoring.";

/// Turns validated judgments into score cards using one weight table.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: Weights,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTS)
    }
}

impl ScoringEngine {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Card recorded for a candidate with nothing to evaluate.
    pub fn no_information_card(&self) -> ScoreCard {
        let criterion_scores = CriterionScores::zeroed();

        ScoreCard {
            criterion_scores,
            weights: self.weights,
            total_score: 0.0,
            confidence: Confidence::Low,
            tier: Tier::C,
            rationale_bullets: vec![NO_INFORMATION_RATIONALE.to_string()],
            proof_points: Vec::new(),
            flags: Vec::new(),
            disqualifiers: vec![NO_INFORMATION_DISQUALIFIER.to_string()],
            next_step: NO_INFORMATION_NEXT_STEP.to_string(),
            scored_at: Utc::now(),
        }
    }

    /// Redact contact details, cap confidence by evidence, and compute the total.
    ///
    /// Without evidence every proof point is relabelled [`SupportType::ToVerify`]. The tier is
    /// left at `C` for the project-wide pass to overwrite.
    pub fn score_card(&self, judgment: Judgment, has_evidence: bool) -> ScoreCard {
        let disqualifiers: Vec<String> = judgment
            .disqualifiers
            .iter()
            .map(|label| redact(label))
            .collect();
        let total_score =
            compute_total_score(&judgment.criterion_scores, &disqualifiers, &self.weights);

        let proof_points = judgment
            .proof_points
            .into_iter()
            .map(|point| ProofPoint {
                text: redact(&point.text),
                support_type: if has_evidence {
                    point.support_type
                } else {
                    SupportType::ToVerify
                },
                url: point.url,
            })
            .collect();

        ScoreCard {
            criterion_scores: judgment.criterion_scores,
            weights: self.weights,
            total_score,
            confidence: enforce_confidence(judgment.confidence, has_evidence),
            tier: Tier::C,
            rationale_bullets: judgment.rationale_bullets.iter().map(|b| redact(b)).collect(),
            proof_points,
            flags: judgment.flags.iter().map(|flag| redact(flag)).collect(),
            disqualifiers,
            next_step: redact(&judgment.next_step),
            scored_at: Utc::now(),
        }
    }
}
