use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::card::Tier;
use super::disqualifiers::any_hard;
use crate::workflows::partners::domain::CandidateId;

pub const TIER_A_TARGET: usize = 5;
/// Ranks admitted to A regardless of soft disqualifiers.
pub const TIER_A_UNCONDITIONAL: usize = 3;
pub const TIER_B_TARGET: usize = 7;
/// Minimum B size the backfill step tries to reach from non-hard C candidates.
pub const TIER_B_FLOOR: usize = 5;

const HARD_PENALTY: f64 = 40.0;
const SOFT_PENALTY: f64 = 15.0;

/// One scored candidate as seen by the tiering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCandidate {
    pub candidate_id: CandidateId,
    pub total_score: f64,
    pub disqualifiers: Vec<String>,
}

struct Ranked<'a> {
    candidate_id: &'a CandidateId,
    adjusted: f64,
    hard: bool,
    clean: bool,
}

/// Ranking-only score; the stored total is never changed.
pub fn adjusted_score(total_score: f64, disqualifiers: &[String]) -> f64 {
    let penalty = if any_hard(disqualifiers) {
        HARD_PENALTY
    } else if has_any(disqualifiers) {
        SOFT_PENALTY
    } else {
        0.0
    };
    (total_score - penalty).max(0.0)
}

fn has_any(disqualifiers: &[String]) -> bool {
    disqualifiers.iter().any(|label| !label.trim().is_empty())
}

/// Assign A/B/C across every scored candidate of one project.
///
/// Greedy walk over the adjusted ranking, then an overflow trim on A and a backfill of B from
/// non-hard C candidates. Hard disqualifiers always land in C and are never promoted.
pub fn tier_buckets(candidates: &[TierCandidate]) -> BTreeMap<CandidateId, Tier> {
    let mut ranked: Vec<Ranked<'_>> = candidates
        .iter()
        .map(|candidate| Ranked {
            candidate_id: &candidate.candidate_id,
            adjusted: adjusted_score(candidate.total_score, &candidate.disqualifiers),
            hard: any_hard(&candidate.disqualifiers),
            clean: !has_any(&candidate.disqualifiers),
        })
        .collect();
    // sort_by is stable: equal adjusted scores keep input order.
    ranked.sort_by(|left, right| right.adjusted.total_cmp(&left.adjusted));

    let mut tiers = Vec::with_capacity(ranked.len());
    let mut a_count = 0usize;
    let mut b_count = 0usize;

    for entry in &ranked {
        let tier = if entry.hard {
            Tier::C
        } else if a_count < TIER_A_UNCONDITIONAL {
            a_count += 1;
            Tier::A
        } else if a_count < TIER_A_TARGET {
            if entry.clean {
                a_count += 1;
                Tier::A
            } else {
                b_count += 1;
                Tier::B
            }
        } else if b_count < TIER_B_TARGET {
            b_count += 1;
            Tier::B
        } else {
            Tier::C
        };
        tiers.push(tier);
    }

    if a_count > TIER_A_TARGET {
        for tier in tiers
            .iter_mut()
            .filter(|tier| **tier == Tier::A)
            .skip(TIER_A_TARGET)
        {
            *tier = Tier::B;
        }
    }

    let b_total = tiers.iter().filter(|tier| **tier == Tier::B).count();
    if b_total < TIER_B_FLOOR {
        let mut needed = TIER_B_FLOOR - b_total;
        for (entry, tier) in ranked.iter().zip(tiers.iter_mut()) {
            if needed == 0 {
                break;
            }
            if *tier == Tier::C && !entry.hard {
                *tier = Tier::B;
                needed -= 1;
            }
        }
    }

    ranked
        .iter()
        .zip(tiers)
        .map(|(entry, tier)| (entry.candidate_id.clone(), tier))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, total_score: f64, disqualifiers: &[&str]) -> TierCandidate {
        TierCandidate {
            candidate_id: CandidateId(id.to_string()),
            total_score,
            disqualifiers: disqualifiers.iter().map(|label| label.to_string()).collect(),
        }
    }

    fn tier_of(tiers: &BTreeMap<CandidateId, Tier>, id: &str) -> Tier {
        *tiers
            .get(&CandidateId(id.to_string()))
            .expect("candidate tiered")
    }

    fn count(tiers: &BTreeMap<CandidateId, Tier>, wanted: Tier) -> usize {
        tiers.values().filter(|tier| **tier == wanted).count()
    }

    #[test]
    fn adjusted_score_applies_penalties_with_floor() {
        assert_eq!(adjusted_score(80.0, &[]), 80.0);
        assert_eq!(adjusted_score(80.0, &["thin licensing record".to_string()]), 65.0);
        assert_eq!(adjusted_score(80.0, &["dormant".to_string()]), 40.0);
        assert_eq!(adjusted_score(30.0, &["dormant".to_string()]), 0.0);
        assert_eq!(adjusted_score(50.0, &["   ".to_string()]), 50.0);
    }

    #[test]
    fn fifteen_clean_candidates_fill_targets() {
        let candidates: Vec<_> = (0..15)
            .map(|index| candidate(&format!("c{index:02}"), 95.0 - index as f64 * 3.0, &[]))
            .collect();
        let tiers = tier_buckets(&candidates);

        for index in 0..5 {
            assert_eq!(tier_of(&tiers, &format!("c{index:02}")), Tier::A);
        }
        for index in 5..12 {
            assert_eq!(tier_of(&tiers, &format!("c{index:02}")), Tier::B);
        }
        for index in 12..15 {
            assert_eq!(tier_of(&tiers, &format!("c{index:02}")), Tier::C);
        }
    }

    #[test]
    fn hard_disqualifier_is_vetoed_even_at_the_top() {
        let tiers = tier_buckets(&[
            candidate("dormant", 100.0, &["Brand appears dormant"]),
            candidate("one", 60.0, &[]),
            candidate("two", 55.0, &[]),
        ]);
        assert_eq!(tier_of(&tiers, "dormant"), Tier::C);
        assert_eq!(tier_of(&tiers, "one"), Tier::A);
        assert_eq!(tier_of(&tiers, "two"), Tier::A);
    }

    #[test]
    fn backfill_never_promotes_hard_candidates() {
        let tiers = tier_buckets(&[
            candidate("a1", 90.0, &[]),
            candidate("a2", 85.0, &[]),
            candidate("a3", 80.0, &[]),
            candidate("dead", 95.0, &["website down"]),
            candidate("quality", 70.0, &["quality issues reported"]),
        ]);
        assert_eq!(count(&tiers, Tier::A), 3);
        assert_eq!(count(&tiers, Tier::B), 0);
        assert_eq!(tier_of(&tiers, "dead"), Tier::C);
        assert_eq!(tier_of(&tiers, "quality"), Tier::C);
    }

    #[test]
    fn soft_disqualifier_in_slot_four_routes_to_b_without_resorting() {
        let tiers = tier_buckets(&[
            candidate("c1", 90.0, &[]),
            candidate("c2", 88.0, &[]),
            candidate("c3", 86.0, &[]),
            candidate("c4", 99.0, &["limited licensing history"]),
            candidate("c5", 80.0, &[]),
            candidate("c6", 78.0, &[]),
            candidate("c7", 76.0, &[]),
        ]);
        assert_eq!(tier_of(&tiers, "c4"), Tier::B);
        assert_eq!(tier_of(&tiers, "c5"), Tier::A);
        assert_eq!(tier_of(&tiers, "c6"), Tier::A);
        assert_eq!(tier_of(&tiers, "c7"), Tier::B);
        assert_eq!(count(&tiers, Tier::A), 5);
    }

    #[test]
    fn soft_disqualifiers_in_top_three_still_reach_a() {
        let tiers = tier_buckets(&[
            candidate("s1", 95.0, &["scale stretch"]),
            candidate("s2", 94.0, &["scale stretch"]),
            candidate("s3", 93.0, &["scale stretch"]),
            candidate("s4", 92.0, &["scale stretch"]),
        ]);
        assert_eq!(tier_of(&tiers, "s1"), Tier::A);
        assert_eq!(tier_of(&tiers, "s3"), Tier::A);
        assert_eq!(tier_of(&tiers, "s4"), Tier::B);
    }

    #[test]
    fn small_pools_are_not_padded() {
        let tiers = tier_buckets(&[
            candidate("only", 40.0, &[]),
            candidate("gone", 90.0, &["No information available; cannot evaluate"]),
        ]);
        assert_eq!(tier_of(&tiers, "only"), Tier::A);
        assert_eq!(tier_of(&tiers, "gone"), Tier::C);
        assert_eq!(tiers.len(), 2);
    }

    #[test]
    fn ties_keep_input_order() {
        let candidates: Vec<_> = (0..6)
            .map(|index| candidate(&format!("t{index}"), 50.0, &[]))
            .collect();
        let tiers = tier_buckets(&candidates);
        assert_eq!(tier_of(&tiers, "t4"), Tier::A);
        assert_eq!(tier_of(&tiers, "t5"), Tier::B);
    }

    #[test]
    fn tier_a_never_exceeds_target() {
        for size in 0..30 {
            let candidates: Vec<_> = (0..size)
                .map(|index| {
                    let labels: &[&str] = if index % 4 == 1 {
                        &["minor gap"]
                    } else if index % 7 == 3 {
                        &["dormant"]
                    } else {
                        &[]
                    };
                    candidate(&format!("p{index:02}"), 100.0 - index as f64, labels)
                })
                .collect();
            let tiers = tier_buckets(&candidates);
            assert!(count(&tiers, Tier::A) <= TIER_A_TARGET);
            for entry in &candidates {
                if any_hard(&entry.disqualifiers) {
                    assert_eq!(tiers[&entry.candidate_id], Tier::C);
                }
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_assignment() {
        assert!(tier_buckets(&[]).is_empty());
    }
}
