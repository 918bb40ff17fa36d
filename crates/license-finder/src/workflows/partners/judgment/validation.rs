use serde::{Deserialize, Serialize};

use crate::workflows::partners::sanitize::{clamp_text, normalize_url, redact};
use crate::workflows::partners::scoring::disqualifiers::{
    normalize_disqualifiers, MAX_DISQUALIFIERS,
};
use crate::workflows::partners::scoring::{
    Confidence, Criterion, CriterionScores, ProofPoint, SupportType, MAX_CRITERION_SCORE,
};

const MAX_DISQUALIFIER_CHARS: usize = 80;
const MAX_FLAGS: usize = 10;
const MAX_FLAG_CHARS: usize = 120;
const RATIONALE_RANGE: (usize, usize) = (3, 5);
const MAX_RATIONALE_CHARS: usize = 240;
const PROOF_POINT_RANGE: (usize, usize) = (2, 10);
const MAX_PROOF_POINT_CHARS: usize = 400;
const MAX_NEXT_STEP_CHARS: usize = 400;
const MIN_OUTREACH_BODY_CHARS: usize = 20;
pub const MAX_OUTREACH_SUBJECT_CHARS: usize = 140;
pub const MAX_OUTREACH_BODY_CHARS: usize = 2500;

/// Criterion scores as received; kept wide so out-of-range values can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCriterionScores {
    pub category_fit: Option<i64>,
    pub distribution_alignment: Option<i64>,
    pub licensing_activity: Option<i64>,
    pub scale_appropriateness: Option<i64>,
    pub quality_reputation: Option<i64>,
    pub geo_coverage: Option<i64>,
    pub recent_momentum: Option<i64>,
    pub manufacturing_capability: Option<i64>,
}

impl RawCriterionScores {
    pub fn uniform(score: i64) -> Self {
        Self {
            category_fit: Some(score),
            distribution_alignment: Some(score),
            licensing_activity: Some(score),
            scale_appropriateness: Some(score),
            quality_reputation: Some(score),
            geo_coverage: Some(score),
            recent_momentum: Some(score),
            manufacturing_capability: Some(score),
        }
    }

    fn get(&self, criterion: Criterion) -> Option<i64> {
        match criterion {
            Criterion::CategoryFit => self.category_fit,
            Criterion::DistributionAlignment => self.distribution_alignment,
            Criterion::LicensingActivity => self.licensing_activity,
            Criterion::ScaleAppropriateness => self.scale_appropriateness,
            Criterion::QualityReputation => self.quality_reputation,
            Criterion::GeoCoverage => self.geo_coverage,
            Criterion::RecentMomentum => self.recent_momentum,
            Criterion::ManufacturingCapability => self.manufacturing_capability,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProofPoint {
    pub text: String,
    pub support_type: Option<String>,
    pub url: Option<String>,
}

/// Judgment payload exactly as the source produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawJudgment {
    pub criterion_scores: Option<RawCriterionScores>,
    pub disqualifiers: Vec<String>,
    pub flags: Vec<String>,
    pub rationale_bullets: Vec<String>,
    pub proof_points: Vec<RawProofPoint>,
    pub confidence: Option<String>,
    pub next_step: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOutreachDraft {
    pub subject: String,
    pub body: String,
}

/// Judgment that passed every contract check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub criterion_scores: CriterionScores,
    pub disqualifiers: Vec<String>,
    pub flags: Vec<String>,
    pub rationale_bullets: Vec<String>,
    pub proof_points: Vec<ProofPoint>,
    pub confidence: Confidence,
    pub next_step: String,
}

/// Redacted and clamped outreach subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachCopy {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgmentValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("score for {criterion} must be within 0..=5 (got {value})")]
    ScoreOutOfRange { criterion: &'static str, value: i64 },
    #[error("expected at most {max} {field} (got {count})")]
    TooMany {
        field: &'static str,
        max: usize,
        count: usize,
    },
    #[error("expected between {min} and {max} {field} (got {count})")]
    CountOutOfRange {
        field: &'static str,
        min: usize,
        max: usize,
        count: usize,
    },
    #[error("{field} entry {index} exceeds {max} characters")]
    EntryTooLong {
        field: &'static str,
        index: usize,
        max: usize,
    },
    #[error("{field} entry {index} is blank")]
    BlankEntry { field: &'static str, index: usize },
    #[error("unknown support type `{0}`")]
    UnknownSupportType(String),
    #[error("unknown confidence `{0}`")]
    UnknownConfidence(String),
    #[error("proof point {index} carries an invalid url")]
    InvalidUrl { index: usize },
    #[error("outreach body must be at least {min} characters (got {count})")]
    BodyTooShort { min: usize, count: usize },
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn check_entries(
    field: &'static str,
    entries: &[String],
    max_chars: usize,
) -> Result<(), JudgmentValidationError> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.trim().is_empty() {
            return Err(JudgmentValidationError::BlankEntry { field, index });
        }
        if char_len(entry) > max_chars {
            return Err(JudgmentValidationError::EntryTooLong {
                field,
                index,
                max: max_chars,
            });
        }
    }
    Ok(())
}

fn check_count(
    field: &'static str,
    count: usize,
    (min, max): (usize, usize),
) -> Result<(), JudgmentValidationError> {
    if count < min || count > max {
        return Err(JudgmentValidationError::CountOutOfRange {
            field,
            min,
            max,
            count,
        });
    }
    Ok(())
}

fn parse_support_type(raw: Option<&str>) -> Result<SupportType, JudgmentValidationError> {
    match raw.map(str::trim) {
        Some("link_supported") => Ok(SupportType::LinkSupported),
        Some("user_provided_excerpt") => Ok(SupportType::UserProvidedExcerpt),
        Some("to_verify") => Ok(SupportType::ToVerify),
        Some("assumed") => Ok(SupportType::Assumed),
        Some(other) => Err(JudgmentValidationError::UnknownSupportType(other.to_string())),
        None => Err(JudgmentValidationError::MissingField("proofPoints[].supportType")),
    }
}

fn parse_confidence(raw: Option<&str>) -> Result<Confidence, JudgmentValidationError> {
    match raw.map(str::trim) {
        Some("High") => Ok(Confidence::High),
        Some("Medium") => Ok(Confidence::Medium),
        Some("Low") => Ok(Confidence::Low),
        Some(other) => Err(JudgmentValidationError::UnknownConfidence(other.to_string())),
        None => Err(JudgmentValidationError::MissingField("confidence")),
    }
}

fn validate_scores(raw: &RawCriterionScores) -> Result<CriterionScores, JudgmentValidationError> {
    let mut scores = CriterionScores::zeroed();
    for criterion in Criterion::ALL {
        let value = raw
            .get(criterion)
            .ok_or(JudgmentValidationError::MissingField(criterion.key()))?;
        let score = u8::try_from(value)
            .ok()
            .filter(|score| *score <= MAX_CRITERION_SCORE)
            .ok_or(JudgmentValidationError::ScoreOutOfRange {
                criterion: criterion.key(),
                value,
            })?;
        scores.set(criterion, score);
    }
    Ok(scores)
}

/// Check a raw judgment against the contract. Nothing is clamped.
///
/// Blank disqualifiers and flags are dropped after trimming; every other list must already
/// satisfy its bounds.
pub fn validate_judgment(raw: RawJudgment) -> Result<Judgment, JudgmentValidationError> {
    let criterion_scores = validate_scores(
        raw.criterion_scores
            .as_ref()
            .ok_or(JudgmentValidationError::MissingField("criterionScores"))?,
    )?;

    let present = raw
        .disqualifiers
        .iter()
        .filter(|label| !label.trim().is_empty())
        .count();
    if present > MAX_DISQUALIFIERS {
        return Err(JudgmentValidationError::TooMany {
            field: "disqualifiers",
            max: MAX_DISQUALIFIERS,
            count: present,
        });
    }
    let disqualifiers = normalize_disqualifiers(&raw.disqualifiers);
    check_entries("disqualifiers", &disqualifiers, MAX_DISQUALIFIER_CHARS)?;

    let flags: Vec<String> = raw
        .flags
        .iter()
        .map(|flag| flag.trim().to_string())
        .filter(|flag| !flag.is_empty())
        .collect();
    if flags.len() > MAX_FLAGS {
        return Err(JudgmentValidationError::TooMany {
            field: "flags",
            max: MAX_FLAGS,
            count: flags.len(),
        });
    }
    check_entries("flags", &flags, MAX_FLAG_CHARS)?;

    check_count("rationaleBullets", raw.rationale_bullets.len(), RATIONALE_RANGE)?;
    check_entries(
        "rationaleBullets",
        &raw.rationale_bullets,
        MAX_RATIONALE_CHARS,
    )?;

    check_count("proofPoints", raw.proof_points.len(), PROOF_POINT_RANGE)?;
    let mut proof_points = Vec::with_capacity(raw.proof_points.len());
    for (index, point) in raw.proof_points.into_iter().enumerate() {
        if point.text.trim().is_empty() {
            return Err(JudgmentValidationError::BlankEntry {
                field: "proofPoints",
                index,
            });
        }
        if char_len(&point.text) > MAX_PROOF_POINT_CHARS {
            return Err(JudgmentValidationError::EntryTooLong {
                field: "proofPoints",
                index,
                max: MAX_PROOF_POINT_CHARS,
            });
        }
        let support_type = parse_support_type(point.support_type.as_deref())?;
        let url = match point.url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(url) => Some(normalize_url(url).ok_or(JudgmentValidationError::InvalidUrl { index })?),
        };
        proof_points.push(ProofPoint {
            text: point.text.trim().to_string(),
            support_type,
            url,
        });
    }

    let confidence = parse_confidence(raw.confidence.as_deref())?;

    let next_step = raw
        .next_step
        .map(|step| step.trim().to_string())
        .filter(|step| !step.is_empty())
        .ok_or(JudgmentValidationError::MissingField("nextStep"))?;
    if char_len(&next_step) > MAX_NEXT_STEP_CHARS {
        return Err(JudgmentValidationError::EntryTooLong {
            field: "nextStep",
            index: 0,
            max: MAX_NEXT_STEP_CHARS,
        });
    }

    Ok(Judgment {
        criterion_scores,
        disqualifiers,
        flags,
        rationale_bullets: raw
            .rationale_bullets
            .into_iter()
            .map(|bullet| bullet.trim().to_string())
            .collect(),
        proof_points,
        confidence,
        next_step,
    })
}

/// Require a subject and a body of useful length, then redact and clamp both.
pub fn validate_outreach(raw: RawOutreachDraft) -> Result<OutreachCopy, JudgmentValidationError> {
    let subject = raw.subject.trim();
    if subject.is_empty() {
        return Err(JudgmentValidationError::MissingField("subject"));
    }
    let body = raw.body.trim();
    let count = char_len(body);
    if count < MIN_OUTREACH_BODY_CHARS {
        return Err(JudgmentValidationError::BodyTooShort {
            min: MIN_OUTREACH_BODY_CHARS,
            count,
        });
    }

    Ok(OutreachCopy {
        subject: clamp_text(&redact(subject), MAX_OUTREACH_SUBJECT_CHARS),
        body: clamp_text(&redact(body), MAX_OUTREACH_BODY_CHARS),
    })
}
