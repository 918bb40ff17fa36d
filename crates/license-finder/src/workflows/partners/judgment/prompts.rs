//! Prompt text for chat-completion backed judgment sources.

use crate::workflows::partners::domain::ProjectBrief;
use crate::workflows::partners::sanitize::clamp_text;

use super::{AssessmentRequest, OutreachRequest, MAX_EVIDENCE_BULLETS};

const MAX_CUSTOM_FIELDS: usize = 20;

pub fn system_preamble() -> String {
    [
        "You are a careful analyst assisting a licensing professional.",
        "You must follow instructions exactly.",
        "Never invent evidence. If a claim is not supported by a user-provided public URL or user-provided excerpt, label it as to_verify.",
        "Do NOT include personal contact details (no emails, phone numbers, names). Use only role/titles.",
        "All outputs MUST be valid JSON with no additional text.",
    ]
    .join("\n")
}

fn intake_lines(brief: &ProjectBrief) -> Vec<String> {
    let field = |value: &Option<String>, fallback: &str| {
        value.as_deref().unwrap_or(fallback).to_string()
    };
    vec![
        "\nProject intake:".to_string(),
        format!("- Brand category: {}", field(&brief.brand_category, "(missing)")),
        format!(
            "- Product types sought: {}",
            field(&brief.product_type_sought, "(missing)")
        ),
        format!("- Price range: {}", field(&brief.price_range, "(missing)")),
        format!(
            "- Distribution preference: {}",
            field(&brief.distribution_preference, "(missing)")
        ),
        format!("- Geography: {}", field(&brief.geography, "(optional)")),
        format!(
            "- Positioning keywords: {}",
            field(&brief.positioning_keywords, "(optional)")
        ),
        format!("- Constraints: {}", field(&brief.constraints, "(optional)")),
    ]
}

pub fn assessment_prompt(request: &AssessmentRequest) -> String {
    let evidence = if request.evidence.is_empty() {
        "  (none)".to_string()
    } else {
        request
            .evidence
            .iter()
            .take(MAX_EVIDENCE_BULLETS)
            .enumerate()
            .map(|(index, bullet)| {
                format!(
                    "  {}. {} (source: {})",
                    index + 1,
                    clamp_text(&bullet.text, 240),
                    bullet.url
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut lines = vec![
        "Score the candidate for licensing partner fit for this project.".to_string(),
        "You MUST follow the scoring criteria and constraints.".to_string(),
        "Evidence sources include link-supported evidence bullets, user-provided notes, and additional user-provided data fields. All of these count as real evidence when assessing the evidence level.".to_string(),
        "If there is NO evidence at all, all proofPoints MUST be labeled to_verify and phrased as verification steps (not claims).".to_string(),
        "If the candidate has user-provided notes or additional data, use supportType 'user_provided_excerpt' for claims derived from that data.".to_string(),
        "The 'confidence' field is the EVIDENCE LEVEL: 'High' when multiple sources corroborate the assessment, 'Medium' when some evidence supports it, 'Low' when there is little or none.".to_string(),
    ];
    lines.extend(intake_lines(&request.brief));
    lines.push("\nCandidate:".to_string());
    lines.push(format!("- Name: {}", request.candidate_name));
    lines.push(format!(
        "- Website: {}",
        request.website.as_deref().unwrap_or("(none)")
    ));
    lines.push(format!(
        "- Notes: {}",
        request.notes.as_deref().unwrap_or("(none)")
    ));
    if !request.custom_data.is_empty() {
        lines.push("\nAdditional user-provided data:".to_string());
        for (key, value) in request.custom_data.iter().take(MAX_CUSTOM_FIELDS) {
            lines.push(format!("- {key}: {}", clamp_text(value, 300)));
        }
    }
    lines.push("\nEvidence bullets (user-provided, link-supported):".to_string());
    lines.push(evidence);
    lines.extend(
        [
            "\nScoring criteria (0-5 each): categoryFit, distributionAlignment, licensingActivity, scaleAppropriateness, qualityReputation, geoCoverage, recentMomentum, manufacturingCapability.",
            "Disqualifiers (use EXACT labels when applicable):",
            "  - 'distribution mismatch': channels fundamentally incompatible (mass market vs. specialty/premium). Zeros the Distribution pillar.",
            "  - 'wrong category': operates in an unrelated product category. Zeros the Category pillar.",
            "  - 'dormant/dead': the company appears inactive, defunct, or has a non-functional website.",
            "  - 'known quality issues': documented quality or reputation problems.",
            "  - 'extreme scale mismatch': far too large or too small for the project.",
            "\nOutput JSON schema:",
            "{\n  criterionScores: { categoryFit: int, distributionAlignment: int, licensingActivity: int, scaleAppropriateness: int, qualityReputation: int, geoCoverage: int, recentMomentum: int, manufacturingCapability: int },\n  disqualifiers: string[],\n  flags: string[],\n  rationaleBullets: string[3-5],\n  proofPoints: [{ text: string, supportType: 'link_supported'|'user_provided_excerpt'|'to_verify'|'assumed', url?: string|null }, ...],\n  confidence: 'High'|'Medium'|'Low',\n  nextStep: string\n}",
        ]
        .map(str::to_string),
    );
    lines.join("\n")
}

pub fn outreach_prompt(request: &OutreachRequest) -> String {
    let points = request
        .proof_points
        .iter()
        .take(3)
        .map(|point| match &point.url {
            Some(url) => format!("- {} (source: {url})", clamp_text(&point.text, 180)),
            None => format!("- {}", clamp_text(&point.text, 180)),
        })
        .collect::<Vec<_>>();

    [
        "Write a warm, professional outreach email draft for a licensing/partnerships conversation.".to_string(),
        "Avoid spammy marketing language.".to_string(),
        "Do NOT include personal contact details; use role/title placeholders.".to_string(),
        "If proof points are to_verify, include placeholders rather than asserting facts.".to_string(),
        "Return JSON only.".to_string(),
        "\nProject brief:".to_string(),
        clamp_text(&request.brief.summary(), 700),
        "\nCandidate:".to_string(),
        format!("- {}", request.candidate_name),
        format!(
            "- Website: {}",
            request.website.as_deref().unwrap_or("(none)")
        ),
        "\nProof points (may be to_verify):".to_string(),
        if points.is_empty() {
            "(none)".to_string()
        } else {
            points.join("\n")
        },
        "\nOutput JSON schema:".to_string(),
        "{ subject: string, body: string }".to_string(),
    ]
    .join("\n")
}
