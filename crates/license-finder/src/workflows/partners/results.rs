use serde::Serialize;

use super::domain::Project;
use super::repository::CandidateRecord;
use super::roster::export_filename;
use super::scoring::Tier;

#[derive(Debug, Clone, Serialize)]
pub struct TierGroup {
    pub tier: Tier,
    pub candidates: Vec<CandidateRecord>,
}

/// Candidates bucketed by tier, each bucket sorted by total score descending.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectResults {
    pub project: Project,
    pub groups: Vec<TierGroup>,
    pub unscored: Vec<CandidateRecord>,
    pub export_filename: String,
}

impl ProjectResults {
    pub fn from_records(project: Project, records: Vec<CandidateRecord>) -> Self {
        let mut groups: Vec<TierGroup> = Tier::ALL
            .iter()
            .map(|tier| TierGroup {
                tier: *tier,
                candidates: Vec::new(),
            })
            .collect();
        let mut unscored = Vec::new();

        for record in records {
            match record.tier() {
                Some(tier) => {
                    if let Some(group) = groups.iter_mut().find(|group| group.tier == tier) {
                        group.candidates.push(record);
                    }
                }
                None => unscored.push(record),
            }
        }

        for group in &mut groups {
            group.candidates.sort_by(|left, right| {
                let left = left.total_score().unwrap_or_default();
                let right = right.total_score().unwrap_or_default();
                right.total_cmp(&left)
            });
        }

        let export_filename = export_filename(&project);
        Self {
            project,
            groups,
            unscored,
            export_filename,
        }
    }

    pub fn group(&self, tier: Tier) -> &[CandidateRecord] {
        self.groups
            .iter()
            .find(|group| group.tier == tier)
            .map(|group| group.candidates.as_slice())
            .unwrap_or_default()
    }

    pub fn scored_count(&self) -> usize {
        self.groups.iter().map(|group| group.candidates.len()).sum()
    }
}
