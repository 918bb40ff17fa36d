use serde::{Deserialize, Serialize};

/// Highest rating a judgment may assign to a single criterion.
pub const MAX_CRITERION_SCORE: u8 = 5;

/// The eight rubric criteria a candidate is rated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    CategoryFit,
    DistributionAlignment,
    LicensingActivity,
    ScaleAppropriateness,
    QualityReputation,
    GeoCoverage,
    RecentMomentum,
    ManufacturingCapability,
}

impl Criterion {
    pub const ALL: [Criterion; 8] = [
        Criterion::CategoryFit,
        Criterion::DistributionAlignment,
        Criterion::LicensingActivity,
        Criterion::ScaleAppropriateness,
        Criterion::QualityReputation,
        Criterion::GeoCoverage,
        Criterion::RecentMomentum,
        Criterion::ManufacturingCapability,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Criterion::CategoryFit => "categoryFit",
            Criterion::DistributionAlignment => "distributionAlignment",
            Criterion::LicensingActivity => "licensingActivity",
            Criterion::ScaleAppropriateness => "scaleAppropriateness",
            Criterion::QualityReputation => "qualityReputation",
            Criterion::GeoCoverage => "geoCoverage",
            Criterion::RecentMomentum => "recentMomentum",
            Criterion::ManufacturingCapability => "manufacturingCapability",
        }
    }
}

/// Accepted per-criterion ratings, each within `0..=MAX_CRITERION_SCORE`.
///
/// Construct through judgment validation; out-of-range values are rejected there rather than clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionScores {
    pub category_fit: u8,
    pub distribution_alignment: u8,
    pub licensing_activity: u8,
    pub scale_appropriateness: u8,
    pub quality_reputation: u8,
    pub geo_coverage: u8,
    pub recent_momentum: u8,
    pub manufacturing_capability: u8,
}

impl CriterionScores {
    /// Every criterion at zero, used by the no-information short-circuit.
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn uniform(score: u8) -> Self {
        Self {
            category_fit: score,
            distribution_alignment: score,
            licensing_activity: score,
            scale_appropriateness: score,
            quality_reputation: score,
            geo_coverage: score,
            recent_momentum: score,
            manufacturing_capability: score,
        }
    }

    pub fn get(&self, criterion: Criterion) -> u8 {
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

    pub fn set(&mut self, criterion: Criterion, score: u8) {
        let slot = match criterion {
            Criterion::CategoryFit => &mut self.category_fit,
            Criterion::DistributionAlignment => &mut self.distribution_alignment,
            Criterion::LicensingActivity => &mut self.licensing_activity,
            Criterion::ScaleAppropriateness => &mut self.scale_appropriateness,
            Criterion::QualityReputation => &mut self.quality_reputation,
            Criterion::GeoCoverage => &mut self.geo_coverage,
            Criterion::RecentMomentum => &mut self.recent_momentum,
            Criterion::ManufacturingCapability => &mut self.manufacturing_capability,
        };
        *slot = score;
    }
}

/// Rubric weights. Category and distribution together carry 60% of the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weights {
    pub category_fit: f64,
    pub distribution_alignment: f64,
    pub licensing_activity: f64,
    pub scale_appropriateness: f64,
    pub quality_reputation: f64,
    pub geo_coverage: f64,
    pub recent_momentum: f64,
    pub manufacturing_capability: f64,
}

pub const DEFAULT_WEIGHTS: Weights = Weights {
    category_fit: 0.30,
    distribution_alignment: 0.30,
    licensing_activity: 0.20,
    scale_appropriateness: 0.04,
    quality_reputation: 0.04,
    geo_coverage: 0.04,
    recent_momentum: 0.04,
    manufacturing_capability: 0.04,
};

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl Weights {
    pub fn get(&self, criterion: Criterion) -> f64 {
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

    pub fn sum(&self) -> f64 {
        Criterion::ALL.iter().map(|criterion| self.get(*criterion)).sum()
    }
}
