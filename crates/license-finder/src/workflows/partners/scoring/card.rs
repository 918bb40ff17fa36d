use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::weights::{CriterionScores, Weights};

/// How much supporting evidence backs an assessment (not model certainty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// A: client-ready. B: good fit missing an element. C: wildcard or excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
    C,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::A, Tier::B, Tier::C];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    LinkSupported,
    UserProvidedExcerpt,
    ToVerify,
    Assumed,
}

impl SupportType {
    pub fn label(&self) -> &'static str {
        match self {
            SupportType::LinkSupported => "link_supported",
            SupportType::UserProvidedExcerpt => "user_provided_excerpt",
            SupportType::ToVerify => "to_verify",
            SupportType::Assumed => "assumed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPoint {
    pub text: String,
    pub support_type: SupportType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Durable scoring result for one candidate, replaced wholesale on every re-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub criterion_scores: CriterionScores,
    pub weights: Weights,
    pub total_score: f64,
    pub confidence: Confidence,
    /// Placeholder `C` until the project-wide tiering pass writes the real tier.
    pub tier: Tier,
    pub rationale_bullets: Vec<String>,
    pub proof_points: Vec<ProofPoint>,
    pub flags: Vec<String>,
    pub disqualifiers: Vec<String>,
    pub next_step: String,
    pub scored_at: DateTime<Utc>,
}
