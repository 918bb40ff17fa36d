use license_finder::workflows::partners::domain::CandidateId;
use license_finder::workflows::partners::scoring::{
    compute_total_score, is_hard_disqualifier, tier_buckets, Criterion, CriterionScores, Tier,
    TierCandidate, DEFAULT_WEIGHTS, MAX_CRITERION_SCORE, TIER_A_TARGET,
};

const NONE: [&str; 0] = [];

/// Small deterministic generator so the sweeps cover varied score vectors.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn score(&mut self) -> u8 {
        (self.next() % (u64::from(MAX_CRITERION_SCORE) + 1)) as u8
    }

    fn scores(&mut self) -> CriterionScores {
        let mut scores = CriterionScores::zeroed();
        for criterion in Criterion::ALL {
            scores.set(criterion, self.score());
        }
        scores
    }
}

#[test]
fn totals_stay_within_bounds_and_one_decimal() {
    let mut rng = Lcg(7);
    for _ in 0..500 {
        let total = compute_total_score(&rng.scores(), &NONE, &DEFAULT_WEIGHTS);
        assert!((0.0..=100.0).contains(&total), "total {total} out of range");
        let scaled = total * 10.0;
        assert!((scaled - scaled.round()).abs() < 1e-9, "total {total} has extra precision");
    }
}

#[test]
fn raising_any_criterion_never_lowers_the_total() {
    let mut rng = Lcg(11);
    for _ in 0..200 {
        let base = rng.scores();
        let before = compute_total_score(&base, &NONE, &DEFAULT_WEIGHTS);
        for criterion in Criterion::ALL {
            let current = base.get(criterion);
            if current == MAX_CRITERION_SCORE {
                continue;
            }
            let mut raised = base;
            raised.set(criterion, current + 1);
            let after = compute_total_score(&raised, &NONE, &DEFAULT_WEIGHTS);
            assert!(after >= before, "{criterion:?} lowered {before} to {after}");
        }
    }
}

#[test]
fn pillar_disqualifiers_cap_the_total() {
    let mut rng = Lcg(23);
    for _ in 0..200 {
        let scores = rng.scores();
        let category = compute_total_score(&scores, &["Wrong category"], &DEFAULT_WEIGHTS);
        let distribution =
            compute_total_score(&scores, &["Distribution mismatch"], &DEFAULT_WEIGHTS);
        let both = compute_total_score(
            &scores,
            &["Category mismatch", "Distribution mismatch"],
            &DEFAULT_WEIGHTS,
        );
        assert!(category <= 70.0);
        assert!(distribution <= 70.0);
        assert!(both <= 40.0);
    }
}

#[test]
fn full_marks_with_each_pillar_zeroed() {
    let top = CriterionScores::uniform(MAX_CRITERION_SCORE);
    assert_eq!(
        compute_total_score(&top, &["distribution mismatch: big box"], &DEFAULT_WEIGHTS),
        70.0
    );
    assert_eq!(
        compute_total_score(&top, &["WRONG CATEGORY"], &DEFAULT_WEIGHTS),
        70.0
    );
    assert_eq!(
        compute_total_score(&top, &["Limited licensing history"], &DEFAULT_WEIGHTS),
        100.0
    );
}

#[test]
fn random_pools_respect_tier_limits() {
    let labels = [
        "",
        "Limited licensing history",
        "Brand appears dormant",
        "Website down",
        "Thin press coverage",
    ];
    let mut rng = Lcg(42);
    for round in 0..100 {
        let size = (rng.next() % 25) as usize;
        let pool: Vec<TierCandidate> = (0..size)
            .map(|index| {
                let label = labels[(rng.next() as usize) % labels.len()];
                TierCandidate {
                    candidate_id: CandidateId(format!("cand-{round}-{index:02}")),
                    total_score: compute_total_score(&rng.scores(), &NONE, &DEFAULT_WEIGHTS),
                    disqualifiers: if label.is_empty() {
                        Vec::new()
                    } else {
                        vec![label.to_string()]
                    },
                }
            })
            .collect();

        let tiers = tier_buckets(&pool);

        assert_eq!(tiers.len(), pool.len());
        let tier_a = tiers.values().filter(|tier| **tier == Tier::A).count();
        assert!(tier_a <= TIER_A_TARGET);
        for candidate in &pool {
            if candidate.disqualifiers.iter().any(|label| is_hard_disqualifier(label)) {
                assert_eq!(tiers[&candidate.candidate_id], Tier::C);
            }
        }
        let clean_count = pool.iter().filter(|c| c.disqualifiers.is_empty()).count();
        if clean_count >= TIER_A_TARGET {
            assert_eq!(tier_a, TIER_A_TARGET, "round {round} should fill tier A");
        }
    }
}
