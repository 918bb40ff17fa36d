use super::card::Confidence;
use super::disqualifiers::{any_category, any_distribution};
use super::weights::{Criterion, CriterionScores, Weights, MAX_CRITERION_SCORE};

/// Weighted composite in `[0, 100]`, rounded to one decimal.
///
/// A category or distribution disqualifier zeroes that pillar's fraction before weighting, so
/// with the default table either one caps the result well below the top tiers.
pub fn compute_total_score<S: AsRef<str>>(
    scores: &CriterionScores,
    disqualifiers: &[S],
    weights: &Weights,
) -> f64 {
    let category_zeroed = any_category(disqualifiers);
    let distribution_zeroed = any_distribution(disqualifiers);

    let weighted: f64 = Criterion::ALL
        .iter()
        .map(|criterion| {
            let zeroed = match criterion {
                Criterion::CategoryFit => category_zeroed,
                Criterion::DistributionAlignment => distribution_zeroed,
                _ => false,
            };
            let fraction = if zeroed {
                0.0
            } else {
                f64::from(scores.get(*criterion)) / f64::from(MAX_CRITERION_SCORE)
            };
            fraction * weights.get(*criterion)
        })
        .sum();

    (weighted * 1000.0).round() / 10.0
}

/// Without any evidence the level is always `Low`; otherwise the request passes through.
pub fn enforce_confidence(requested: Confidence, has_evidence: bool) -> Confidence {
    if has_evidence {
        requested
    } else {
        Confidence::Low
    }
}
