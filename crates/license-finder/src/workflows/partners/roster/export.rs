use serde::Serialize;

use crate::workflows::partners::domain::Project;
use crate::workflows::partners::repository::CandidateRecord;
use crate::workflows::partners::sanitize::slugify;

const LIST_SEPARATOR: &str = " | ";

/// One line of the results download.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub tier: &'static str,
    pub total_score: f64,
    pub confidence: &'static str,
    pub company_name: String,
    pub website: String,
    pub provenance: &'static str,
    pub rationale_bullets: String,
    pub proof_points: String,
    pub flags: String,
    pub disqualifiers: String,
    pub next_step: String,
    pub outreach_subject: String,
}

/// Scored candidates only, highest total first. Ties keep input order.
pub fn export_rows(records: &[CandidateRecord]) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = records
        .iter()
        .filter_map(|record| {
            let card = record.score_card.as_ref()?;
            Some(ExportRow {
                tier: card.tier.label(),
                total_score: card.total_score,
                confidence: card.confidence.label(),
                company_name: record.candidate.name.clone(),
                website: record.candidate.website.clone().unwrap_or_default(),
                provenance: record.candidate.provenance.label(),
                rationale_bullets: card.rationale_bullets.join(LIST_SEPARATOR),
                proof_points: card
                    .proof_points
                    .iter()
                    .map(|point| format!("{} ({})", point.text, point.support_type.label()))
                    .collect::<Vec<_>>()
                    .join(LIST_SEPARATOR),
                flags: card.flags.join(LIST_SEPARATOR),
                disqualifiers: card.disqualifiers.join(LIST_SEPARATOR),
                next_step: card.next_step.clone(),
                outreach_subject: record
                    .outreach
                    .as_ref()
                    .map(|draft| draft.subject.clone())
                    .unwrap_or_default(),
            })
        })
        .collect();
    rows.sort_by(|left, right| right.total_score.total_cmp(&left.total_score));
    rows
}

/// Header plus rows as CSV text; empty when nothing has been scored.
pub fn render_csv(rows: &[ExportRow]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn export_filename(project: &Project) -> String {
    let prefix: String = project.id.0.chars().take(6).collect();
    format!("license-finder-{}-{prefix}.csv", slugify(&project.name))
}
