use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::SupportType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvidenceLinkId(pub String);

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";
pub const MAX_PROJECT_NAME_CHARS: usize = 80;
pub const MAX_CANDIDATE_NAME_CHARS: usize = 120;
pub const MAX_CANDIDATE_NOTES_CHARS: usize = 500;
pub const MAX_EVIDENCE_EXCERPT_CHARS: usize = 2000;

/// Licensing needs a project is sourcing partners for. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectBrief {
    pub brand_category: Option<String>,
    pub product_type_sought: Option<String>,
    pub price_range: Option<String>,
    pub distribution_preference: Option<String>,
    pub geography: Option<String>,
    pub positioning_keywords: Option<String>,
    pub constraints: Option<String>,
}

impl ProjectBrief {
    /// Trim every field and turn blanks into `None`.
    pub fn normalized(self) -> Self {
        Self {
            brand_category: non_blank(self.brand_category),
            product_type_sought: non_blank(self.product_type_sought),
            price_range: non_blank(self.price_range),
            distribution_preference: non_blank(self.distribution_preference),
            geography: non_blank(self.geography),
            positioning_keywords: non_blank(self.positioning_keywords),
            constraints: non_blank(self.constraints),
        }
    }

    /// Plain-text brief handed to the judgment source when drafting outreach.
    pub fn summary(&self) -> String {
        let required = |value: &Option<String>| value.as_deref().unwrap_or("(missing)").to_string();
        let optional = |value: &Option<String>| value.as_deref().unwrap_or("(optional)").to_string();

        [
            format!("Brand category: {}", required(&self.brand_category)),
            format!("Product types sought: {}", required(&self.product_type_sought)),
            format!("Price range: {}", required(&self.price_range)),
            format!(
                "Distribution preference: {}",
                required(&self.distribution_preference)
            ),
            format!("Geography: {}", optional(&self.geography)),
            format!("Positioning keywords: {}", optional(&self.positioning_keywords)),
            format!("Constraints: {}", optional(&self.constraints)),
        ]
        .join("\n")
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Create/update payload for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProject {
    pub name: Option<String>,
    pub brief: ProjectBrief,
    /// Newline-separated company names never to add.
    pub exclude_list: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub brief: ProjectBrief,
    pub exclude_list: Option<String>,
    pub feedback: Option<ProjectFeedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Manual,
    Uploaded,
    Generated,
}

impl Provenance {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Uploaded => "uploaded",
            Self::Generated => "generated",
        }
    }
}

/// Payload for adding a single candidate by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewCandidate {
    pub name: String,
    pub website: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub project_id: ProjectId,
    pub name: String,
    pub website: Option<String>,
    pub notes: Option<String>,
    /// Extra roster columns keyed by their original header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_data: BTreeMap<String, String>,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
}

/// Already-summarised evidence statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBullet {
    pub text: String,
    pub support_type: SupportType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceLink {
    pub id: EvidenceLinkId,
    pub url: String,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub bullets: Vec<EvidenceBullet>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEvidenceLink {
    pub url: String,
    pub excerpt: Option<String>,
    pub bullets: Vec<EvidenceBullet>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonePreset {
    #[default]
    WarmProfessional,
}

impl TonePreset {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WarmProfessional => "warm_professional",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachDraft {
    pub tone_preset: TonePreset,
    pub subject: String,
    pub body: String,
    pub drafted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    OutreachDrafted,
}

/// Append-only status history for a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub status: OutcomeStatus,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFeedbackInput {
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFeedback {
    /// 1 to 5 when present.
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFeedbackInput {
    pub misfit: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFeedback {
    pub misfit: bool,
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_normalization_drops_blanks() {
        let brief = ProjectBrief {
            brand_category: Some("  Premium outdoor ".to_string()),
            price_range: Some("   ".to_string()),
            ..ProjectBrief::default()
        }
        .normalized();

        assert_eq!(brief.brand_category.as_deref(), Some("Premium outdoor"));
        assert_eq!(brief.price_range, None);
    }

    #[test]
    fn brief_summary_marks_missing_fields() {
        let brief = ProjectBrief {
            brand_category: Some("Premium outdoor".to_string()),
            ..ProjectBrief::default()
        };
        let summary = brief.summary();
        assert!(summary.starts_with("Brand category: Premium outdoor\n"));
        assert!(summary.contains("Price range: (missing)"));
        assert!(summary.ends_with("Constraints: (optional)"));
    }

    #[test]
    fn provenance_serializes_snake_case() {
        let json = serde_json::to_value(Provenance::Uploaded).expect("serialize");
        assert_eq!(json, "uploaded");
        assert_eq!(Provenance::Generated.label(), "generated");
    }
}
