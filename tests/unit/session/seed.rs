use super::*;

#[test]
fn keep_canvas_yields_sentinel() {
    let mut seeds = FixedSeed(7);
    assert_eq!(SeedToken::draw(true, &mut seeds), SeedToken::UseCache);
    assert_eq!(SeedToken::draw(false, &mut seeds), SeedToken::Random(7));
}

#[test]
fn display_and_json_forms() {
    assert_eq!(SeedToken::Random(42).to_string(), "42");
    assert_eq!(SeedToken::UseCache.to_string(), "use_cache");
    assert_eq!(
        serde_json::to_value(SeedToken::Random(u64::MAX)).unwrap(),
        serde_json::json!(u64::MAX)
    );
    assert_eq!(
        serde_json::to_value(SeedToken::UseCache).unwrap(),
        serde_json::json!("use_cache")
    );
}

#[test]
fn thread_rng_source_varies() {
    let mut seeds = ThreadRngSeed;
    let draws: std::collections::HashSet<u64> = (0..8).map(|_| seeds.next_u64()).collect();
    assert!(draws.len() > 1);
}
