use astro_engine::compatibility::{
    CompatibilityScorer, CompatibilityScores, RelationshipType, SCORE_KEYS,
};
use astro_engine::ErrorKind;
use std::collections::BTreeMap;

#[test]
fn test_fixtures_from_json() {
    let scorer = CompatibilityScorer::new();
    let body: BTreeMap<String, f64> = SCORE_KEYS.iter().map(|k| (k.to_string(), 50.0)).collect();
    let json = serde_json::to_string(&body).unwrap();

    let scores: CompatibilityScores = serde_json::from_str(&json).unwrap();
    assert_eq!(scorer.score(&scores, RelationshipType::Consistent).unwrap().overall, 55);
    assert_eq!(
        scorer.score(&CompatibilityScores::uniform(80.0), RelationshipType::Toxic).unwrap().overall,
        65
    );
}

#[test]
fn test_overall_always_within_bounds() {
    let scorer = CompatibilityScorer::new();
    let relationships = [
        RelationshipType::Consistent,
        RelationshipType::Complicated,
        RelationshipType::Toxic,
    ];
    for step in 0..=10 {
        let value = step as f64 * 10.0;
        for hostility in [0.0, 50.0, 100.0] {
            let mut scores = CompatibilityScores::uniform(value);
            scores.hostility = hostility;
            for relationship in relationships {
                let result = scorer.score(&scores, relationship).unwrap();
                assert!(result.overall <= 100);
            }
        }
    }
}

#[test]
fn test_relationship_parsing() {
    assert_eq!("Consistent".parse::<RelationshipType>().unwrap(), RelationshipType::Consistent);
    assert_eq!(" toxic ".parse::<RelationshipType>().unwrap(), RelationshipType::Toxic);
    assert_eq!(
        "situationship".parse::<RelationshipType>().unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
}

#[test]
fn test_missing_key_reported_before_range_errors() {
    let mut map: BTreeMap<String, f64> = SCORE_KEYS.iter().map(|k| (k.to_string(), 500.0)).collect();
    map.remove("hostility");
    let err = CompatibilityScorer::new().score_map(&map, "consistent").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingScoreKey);
}

#[test]
fn test_result_serializes_camel_case() {
    let result = CompatibilityScorer::new()
        .score(&CompatibilityScores::uniform(50.0), RelationshipType::Complicated)
        .unwrap();
    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["overall"], 45);
    assert_eq!(json["relationshipType"], "complicated");
}
