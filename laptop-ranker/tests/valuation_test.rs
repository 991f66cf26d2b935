use laptop_ranker::benchmarks::{BenchmarkStore, BenchmarkTable, DeepSpecTable};
use laptop_ranker::valuation::{EnrichmentStatus, Profile, ValuationEngine};
use laptop_ranker::extract;
use std::sync::Arc;

const TITLE: &str = "PC Portable Gamer Intel Core i7-13700H RTX 4060 140W 16Go 1To 165Hz IPS Windows 11";

fn store_with(cpu_mark: f64, gpu_mark: f64) -> BenchmarkStore {
    BenchmarkStore::new(
        BenchmarkTable::from_pairs(&[("i7-13700h", cpu_mark)]),
        BenchmarkTable::from_pairs(&[("geforce rtx 4060 laptop gpu", gpu_mark)]),
    )
}

fn engine_with(cpu_mark: f64, gpu_mark: f64) -> ValuationEngine {
    ValuationEngine::new(Arc::new(store_with(cpu_mark, gpu_mark)))
}

#[test]
fn test_breakdown_exposes_every_component() {
    let engine = engine_with(67.0, 55.0);
    let b = engine.breakdown(TITLE, "", 1200.0);

    assert_eq!(b.profile, Profile::Gaming);
    assert_eq!(b.cpu.raw, 67.0);
    assert!((b.cpu.weighted - 5.0 * 0.67).abs() < 1e-9);
    assert!((b.tgp_factor - 1.12).abs() < 1e-9);
    assert!((b.gpu.raw - 55.0 * 1.12).abs() < 1e-9);
    assert!((b.display.raw - 0.8).abs() < 1e-9);
    assert_eq!(b.ram.weighted, 1.0);
    assert_eq!(b.storage.weighted, 0.35);
    assert_eq!(b.os.weighted, 0.2);

    let sum = b.cpu.weighted
        + b.gpu.weighted
        + b.display.weighted
        + b.ram.weighted
        + b.storage.weighted
        + b.os.weighted
        + b.deep_bonus.weighted;
    assert!((b.raw_total - sum).abs() < 1e-9);
    assert!((b.score - b.raw_total / b.penalty).abs() < 1e-9);
    assert!((engine.score(TITLE, "", 1200.0) - b.score).abs() < 1e-12);

    let json = b.to_json();
    for key in ["cpu", "gpu", "display", "ram", "storage", "os", "penalty", "score", "enrichment"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn test_higher_marks_never_lower_the_score() {
    let price = 1100.0;
    let mut last = f64::MIN;
    for mark in [0.0, 20.0, 40.0, 60.0, 80.0, 100.0] {
        let score = engine_with(mark, 50.0).score(TITLE, "", price);
        assert!(score >= last, "cpu mark {} lowered score", mark);
        last = score;
    }

    let mut last = f64::MIN;
    for mark in [0.0, 25.0, 50.0, 75.0, 100.0] {
        let score = engine_with(60.0, mark).score(TITLE, "", price);
        assert!(score >= last, "gpu mark {} lowered score", mark);
        last = score;
    }
}

#[test]
fn test_higher_price_never_raises_the_score() {
    for profile in [Profile::Gaming, Profile::Work] {
        let engine = engine_with(67.0, 55.0).profiled(profile);
        let mut last = f64::MAX;
        for price in [0.0, 150.0, 300.0, 650.0, 999.0, 1500.0, 2500.0, 4000.0] {
            let score = engine.score(TITLE, "", price);
            assert!(score <= last, "{} price {} raised score", profile, price);
            last = score;
        }
    }
}

#[test]
fn test_price_floor_flattens_cheap_listings() {
    let engine = engine_with(67.0, 55.0);
    assert_eq!(engine.score(TITLE, "", 50.0), engine.score(TITLE, "", 300.0));
    assert!(engine.score(TITLE, "", 50.0).is_finite());
}

#[test]
fn test_work_profile_weights_cpu_over_gpu() {
    let gaming = engine_with(67.0, 90.0);
    let work = gaming.profiled(Profile::Work);

    let g = gaming.breakdown(TITLE, "", 1200.0);
    let w = work.breakdown(TITLE, "", 1200.0);
    assert!(w.cpu.weighted > g.cpu.weighted);
    assert!(w.gpu.weighted < g.gpu.weighted);
    assert!((w.gpu.weighted - 0.5 * w.gpu.raw / 100.0).abs() < 1e-9);
}

#[test]
fn test_unknown_hardware_scores_low_not_error() {
    let engine = engine_with(67.0, 55.0);
    let b = engine.breakdown("Ordinateur portable 15 pouces", "", 500.0);
    assert_eq!(b.cpu.weighted, 0.0);
    assert_eq!(b.gpu.weighted, 0.0);
    assert!(b.score >= 0.0);
}

#[test]
fn test_enrichment_is_reported() {
    let spec = extract(TITLE);

    let plain = engine_with(67.0, 55.0).evaluate(&spec, 1200.0);
    assert!(matches!(plain.enrichment, EnrichmentStatus::Skipped { .. }));
    assert_eq!(plain.deep_bonus.weighted, 0.0);

    let deep = DeepSpecTable::default()
        .with_vram("geforce rtx 4060 laptop gpu", 8)
        .with_cores("i7-13700h", 14);
    let enriched = ValuationEngine::new(Arc::new(store_with(67.0, 55.0).with_deep_specs(deep)))
        .evaluate(&spec, 1200.0);
    match &enriched.enrichment {
        EnrichmentStatus::Applied { vram_gb, cores, points } => {
            assert_eq!(*vram_gb, Some(8));
            assert_eq!(*cores, Some(14));
            assert_eq!(*points, 13.0);
        }
        other => panic!("expected applied enrichment, got {:?}", other),
    }
    assert!(enriched.score > plain.score);

    let unrelated = DeepSpecTable::default().with_vram("radeon rx 7600m xt", 8);
    let missing = ValuationEngine::new(Arc::new(store_with(67.0, 55.0).with_deep_specs(unrelated)))
        .evaluate(&spec, 1200.0);
    assert_eq!(missing.enrichment, EnrichmentStatus::NotFound);
}
