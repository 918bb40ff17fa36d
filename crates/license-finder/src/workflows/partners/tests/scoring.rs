use super::common::*;

use crate::workflows::partners::judgment::{
    baseline_judgment, validate_judgment, CannedJudgmentSource, RawJudgment, ScriptedAssessment,
};
use crate::workflows::partners::repository::ProjectRepository;
use crate::workflows::partners::scoring::{Confidence, Criterion, ScoringEngine, Tier};

const CATEGORY_MISMATCH_PAYLOAD: &str = r#"{
    "criterionScores": {
        "categoryFit": 4, "distributionAlignment": 4, "licensingActivity": 4,
        "scaleAppropriateness": 4, "qualityReputation": 4, "geoCoverage": 4,
        "recentMomentum": 4, "manufacturingCapability": 4
    },
    "disqualifiers": ["Category mismatch: industrial tooling"],
    "flags": [],
    "rationaleBullets": ["One", "Two", "Three"],
    "proofPoints": [
        {"text": "Catalog is industrial", "supportType": "link_supported", "url": "https://tools.example/catalog"},
        {"text": "No consumer lines", "supportType": "assumed"}
    ],
    "confidence": "High",
    "nextStep": "Pass"
}"#;

#[test]
fn category_mismatch_payload_zeroes_category_pillar() {
    let raw: RawJudgment = serde_json::from_str(CATEGORY_MISMATCH_PAYLOAD).expect("payload");
    let judgment = validate_judgment(raw).expect("valid judgment");

    let card = ScoringEngine::default().score_card(judgment, true);

    assert_eq!(card.total_score, 56.0);
    assert_eq!(card.criterion_scores.get(Criterion::CategoryFit), 4);
    assert_eq!(card.confidence, Confidence::High);
    assert_eq!(
        card.proof_points[0].url.as_deref(),
        Some("https://tools.example/catalog")
    );
}

#[test]
fn soft_disqualifier_after_top_three_lands_in_b() {
    let judgment = CannedJudgmentSource::default()
        .with_script("Top One", judgment_with(5, &[]))
        .with_script("Top Two", judgment_with(5, &[]))
        .with_script("Top Three", judgment_with(5, &[]))
        .with_script("Soft Spot", judgment_with(5, &["Limited licensing history"]));
    let (service, repository, _) = build_service_with(judgment);
    let project = anchor_project(&service);
    for name in ["Top One", "Top Two", "Top Three"] {
        add_named(&service, &project.id, name);
    }
    let soft = add_named(&service, &project.id, "Soft Spot");
    let fifth = add_named(&service, &project.id, "Fifth");
    let sixth = add_named(&service, &project.id, "Sixth");

    service.score_project(&project.id).expect("scoring runs");

    assert_eq!(tier_of(&repository, &soft), Some(Tier::B));
    assert_eq!(tier_of(&repository, &fifth), Some(Tier::A));
    assert_eq!(tier_of(&repository, &sixth), Some(Tier::A));
}

#[test]
fn contact_details_are_redacted_before_storage() {
    let mut raw = baseline_judgment();
    raw.next_step = Some("Email licensing@stojo.co or call +1 (415) 555-0199".to_string());
    let judgment = CannedJudgmentSource::default()
        .with_script("Stojo", ScriptedAssessment::Judgment(raw));
    let (service, repository, _) = build_service_with(judgment);
    let project = anchor_project(&service);
    let id = add_named(&service, &project.id, "Stojo");

    service.score_project(&project.id).expect("scoring runs");

    let card = repository
        .fetch_candidate(&id)
        .expect("fetch")
        .and_then(|record| record.score_card)
        .expect("card stored");
    assert!(!card.next_step.contains("stojo.co"));
    assert!(!card.next_step.contains("555"));
    assert!(card.next_step.contains("[REDACTED EMAIL]"));
    assert!(card.next_step.contains("[REDACTED PHONE]"));
}

#[test]
fn rescoring_replaces_tiers_from_a_fresh_snapshot() {
    let (service, repository, _) = build_service();
    let project = anchor_project(&service);
    let ids: Vec<_> = (0..5)
        .map(|index| add_named(&service, &project.id, &format!("Brand {index}")))
        .collect();
    service.score_project(&project.id).expect("first run");
    assert!(ids
        .iter()
        .all(|id| tier_of(&repository, id) == Some(Tier::A)));

    let stronger: Vec<_> = (0..5)
        .map(|index| add_named(&service, &project.id, &format!("Strong {index}")))
        .collect();
    let judgment = (0..5).fold(CannedJudgmentSource::default(), |source, index| {
        source.with_script(&format!("Strong {index}"), judgment_with(5, &[]))
    });
    let rerun = crate::workflows::partners::PartnerDiscoveryService::new(
        repository.clone(),
        std::sync::Arc::new(judgment),
        &scoring_config(),
    );
    rerun
        .score_candidates(&project.id, &stronger)
        .expect("subset run");

    assert!(stronger
        .iter()
        .all(|id| tier_of(&repository, id) == Some(Tier::A)));
    assert!(ids
        .iter()
        .all(|id| tier_of(&repository, id) == Some(Tier::B)));
    assert_eq!(
        repository
            .candidates_for_project(&project.id)
            .expect("list")
            .len(),
        10
    );
}
