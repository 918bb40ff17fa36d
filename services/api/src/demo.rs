use crate::infra::InMemoryProjectRepository;
use clap::Args;
use license_finder::config::ScoringConfig;
use license_finder::error::AppError;
use license_finder::workflows::partners::judgment::{
    baseline_judgment, RawCriterionScores, RawJudgment,
};
use license_finder::workflows::partners::{
    CannedJudgmentSource, NewCandidate, NewProject, PartnerDiscoveryService, ProjectBrief,
    ProjectId, ProjectResults, Provenance, ScriptedAssessment, Tier,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type DemoService = PartnerDiscoveryService<InMemoryProjectRepository, CannedJudgmentSource>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional roster CSV to import alongside the seeded candidates.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Write the scored results CSV to this path.
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

const EXCLUDE_LIST: &str = "Yeti\nPatagonia\nThe North Face\nHydro Flask\nStanley 1913\nColeman\nIgloo";

/// (name, website, notes)
const SEED_CANDIDATES: [(&str, &str, &str); 10] = [
    ("MiiR", "https://www.miir.com", "Premium drinkware; collaborations."),
    ("GSI Outdoors", "https://www.gsioutdoors.com", "Camp kitchen + drinkware adjacency."),
    ("Snow Peak", "https://www.snowpeak.com", "Premium outdoor lifestyle adjacency."),
    ("Klean Kanteen", "https://www.kleankanteen.com", "Quality reputation; premium positioning."),
    ("Sea to Summit", "https://seatosummit.com", "Outdoor accessory manufacturing capability."),
    ("W&P", "https://wandp.com", "Premium home goods; outdoor entertaining adjacency."),
    ("Stojo", "https://www.stojo.co", "Reusable drinkware; potential licensing openness."),
    ("S'well", "https://www.swell.com", "Premium drinkware; home channel adjacency."),
    ("OXO", "https://www.oxo.com", "Quality home goods; scale/channel risk, verify."),
    ("Stanley 1913", "https://www.stanley1913.com", "Large/obvious, often excluded."),
];

const STRONG_FITS: [&str; 5] = ["MiiR", "GSI Outdoors", "Snow Peak", "Klean Kanteen", "Sea to Summit"];

pub(crate) fn anchor_project() -> NewProject {
    NewProject {
        name: Some("Anchor Scenario: Premium Outdoor to Home Goods".to_string()),
        brief: ProjectBrief {
            brand_category: Some(
                "Premium outdoor lifestyle brand (Yeti/Patagonia aesthetic)".to_string(),
            ),
            product_type_sought: Some(
                "Drinkware, coolers, outdoor entertaining accessories".to_string(),
            ),
            price_range: Some("$40-$150".to_string()),
            distribution_preference: Some(
                "REI, independent outdoor retailers, upscale home goods boutiques (not mass market)"
                    .to_string(),
            ),
            geography: Some("US + Canada".to_string()),
            positioning_keywords: Some(
                "premium, design-led, durable, outdoor entertaining".to_string(),
            ),
            constraints: Some(
                "Avoid mass-market dominated partners; prioritize quality/reputation".to_string(),
            ),
        },
        exclude_list: Some(EXCLUDE_LIST.to_string()),
    }
}

fn adjacent_fit() -> RawJudgment {
    RawJudgment {
        criterion_scores: Some(RawCriterionScores {
            category_fit: Some(3),
            distribution_alignment: Some(3),
            licensing_activity: Some(3),
            scale_appropriateness: Some(3),
            quality_reputation: Some(3),
            geo_coverage: Some(4),
            recent_momentum: Some(3),
            manufacturing_capability: Some(3),
        }),
        ..baseline_judgment()
    }
}

/// Canned judgments shaped like the seeded scenario: five strong fits, adjacent fits for the
/// rest, and a scale risk on OXO.
pub(crate) fn demo_judgments() -> CannedJudgmentSource {
    let mut source = CannedJudgmentSource::new(adjacent_fit());
    for name in STRONG_FITS {
        source = source.with_script(name, ScriptedAssessment::Judgment(baseline_judgment()));
    }
    let mut scale_risk = adjacent_fit();
    scale_risk.disqualifiers = vec!["Scale risk: large mass retail footprint".to_string()];
    source.with_script("OXO", ScriptedAssessment::Judgment(scale_risk))
}

pub(crate) fn seed_demo(service: &DemoService) -> Result<ProjectId, AppError> {
    let project = service.create_project(anchor_project())?;
    for (name, website, notes) in SEED_CANDIDATES {
        let added = service.add_candidate_with_provenance(
            &project.id,
            NewCandidate {
                name: name.to_string(),
                website: Some(website.to_string()),
                notes: Some(notes.to_string()),
            },
            Provenance::Generated,
        )?;
        if added.is_none() {
            println!("  Skipped {name} (exclude list)");
        }
    }
    Ok(project.id)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { roster, export } = args;

    let service = PartnerDiscoveryService::new(
        Arc::new(InMemoryProjectRepository::default()),
        Arc::new(demo_judgments()),
        &ScoringConfig {
            call_delay: Duration::ZERO,
            ..ScoringConfig::default()
        },
    );

    println!("License finder demo");
    let project_id = seed_demo(&service)?;

    if let Some(path) = roster {
        let reader = BufReader::new(File::open(&path)?);
        let summary = service.import_roster(&project_id, reader)?;
        println!(
            "  Imported {} candidates from {} ({} evidence links, {} excluded)",
            summary.imported.len(),
            path.display(),
            summary.evidence_links,
            summary.excluded.len()
        );
        if summary.skipped_over_limit > 0 {
            println!("  Ignored {} rows past the upload limit", summary.skipped_over_limit);
        }
    }

    let run = service.score_project(&project_id)?;
    println!(
        "  Scored {} candidates ({} without information, {} failed)",
        run.scored.len() + run.short_circuited.len(),
        run.short_circuited.len(),
        run.failed.len()
    );
    for failure in &run.failed {
        println!("    - {}: {}", failure.candidate_id.0, failure.reason);
    }

    let outreach = service.draft_outreach_for_tier_a(&project_id)?;
    println!("  Drafted outreach for {} tier A candidates", outreach.drafted.len());

    render_results(&service.results(&project_id)?);

    if let Some(path) = export {
        let file = service.export_csv(&project_id)?;
        std::fs::write(&path, file.body)?;
        println!("\nExported {} to {}", file.filename, path.display());
    }

    Ok(())
}

fn render_results(results: &ProjectResults) {
    println!("\n{}", results.project.name);
    for tier in Tier::ALL {
        let group = results.group(tier);
        println!("\nTier {} ({})", tier.label(), group.len());
        for record in group {
            let Some(card) = record.score_card.as_ref() else {
                continue;
            };
            println!(
                "  {:>5.1}  {:<16} {:<7} {}",
                card.total_score,
                record.candidate.name,
                card.confidence.label(),
                card.disqualifiers.join("; ")
            );
        }
    }
    if !results.unscored.is_empty() {
        println!("\nUnscored: {}", results.unscored.len());
    }
}
