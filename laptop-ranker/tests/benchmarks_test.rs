use laptop_ranker::benchmarks::{BenchmarkStore, BenchmarkTable, DeepSpecTable};
use laptop_ranker::{AppConfig, RankerError};
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

fn config_for(dir: &std::path::Path) -> AppConfig {
    AppConfig {
        bench_dir: dir.to_path_buf(),
        cache_dir: dir.join("cache"),
        ..AppConfig::default()
    }
}

#[test]
fn test_exact_match_wins_over_containment() {
    let table = BenchmarkTable::from_pairs(&[
        ("geforce rtx 4070 laptop gpu", 60.0),
        ("geforce rtx 4070 ti laptop gpu", 70.0),
    ]);

    let hit = table.lookup("GeForce RTX 4070 Laptop GPU").unwrap();
    assert_eq!(hit.name, "geforce rtx 4070 laptop gpu");
    assert_eq!(hit.mark, 60.0);
}

#[test]
fn test_containment_prefers_shorter_name() {
    let table = BenchmarkTable::from_pairs(&[
        ("rtx 4070 super", 80.0),
        ("rtx 4070 ti super", 90.0),
        ("rtx 4070", 60.0),
    ]);

    // "rtx 407" is contained in all three; the shortest wins despite its mark
    assert_eq!(table.lookup("rtx 407").unwrap().name, "rtx 4070");
    // the query carries the distinguishing suffix, so only the Ti Super contains it
    assert_eq!(table.lookup("rtx 4070 ti super").unwrap().mark, 90.0);
}

#[test]
fn test_equal_length_ties_break_on_mark() {
    let table = BenchmarkTable::from_pairs(&[("ryzen 7 7840hs", 71.0), ("ryzen 7 7840hx", 75.0)]);
    assert_eq!(table.lookup("ryzen 7 7840").unwrap().mark, 75.0);
}

#[test]
fn test_miss_is_none() {
    let table = BenchmarkTable::from_pairs(&[("i7-13700h", 67.0)]);
    assert!(table.lookup("snapdragon x elite").is_none());
    assert!(table.lookup("").is_none());
}

#[test]
fn test_store_canonicalizes_raw_titles() {
    let store = BenchmarkStore::new(
        BenchmarkTable::from_pairs(&[("i7-13700hx", 71.0), ("amd ryzen 7 7840hs", 71.0)]),
        BenchmarkTable::from_pairs(&[("geforce rtx 4060 laptop gpu", 55.0)]),
    );

    assert_eq!(store.lookup_cpu("Intel Core i7 13700HX").unwrap().mark, 71.0);
    assert_eq!(store.lookup_gpu("rtx 4060 8go").unwrap().mark, 55.0);
    assert!(store.lookup_gpu("radeon 780m").is_none());
}

#[test]
fn test_snapshot_layouts() {
    let wrapped = r#"{"updated_at": 1718000000, "source": {"url": "saved.html"}, "ranks": {"I7-13700H ": 67.0}}"#;
    let entries = r#"{"entries": [{"name": "i7-13700h", "mark": 67.0, "price": 399.0, "rank": 412}, {"name": "  ", "mark": 1.0}]}"#;
    let flat = r#"{"i7-13700h": 67.0}"#;

    for raw in [wrapped, entries, flat] {
        let table = BenchmarkTable::from_json_str(raw).unwrap();
        assert_eq!(table.len(), 1, "{}", raw);
        assert_eq!(table.lookup("i7-13700h").unwrap().mark, 67.0);
    }

    assert!(matches!(
        BenchmarkTable::from_json_str("[1, 2, 3]"),
        Err(RankerError::Snapshot(_))
    ));
}

#[test]
fn test_deep_spec_counts_accept_text() {
    let deep = DeepSpecTable::from_json_str(
        r#"{
            "gpus": {
                "geforce rtx 4070 laptop gpu": {"vram_gb": 8},
                "radeon rx 7600m xt": {"memory_size_gb": "8 GB"},
                "geforce rtx 4090 laptop gpu": {"vram": "n/a"}
            },
            "cpus": {"amd ryzen 9 7945hx": {"cores": 16}}
        }"#,
    )
    .unwrap();

    assert_eq!(deep.vram_gb("geforce rtx 4070 laptop gpu"), Some(8));
    assert_eq!(deep.vram_gb("radeon rx 7600m xt"), Some(8));
    assert_eq!(deep.vram_gb("geforce rtx 4090 laptop gpu"), None);
    assert_eq!(deep.cores("amd ryzen 9 7945hx"), Some(16));
}

#[tokio::test]
async fn test_load_falls_back_without_snapshots() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let store = BenchmarkStore::load(&config_for(dir.path())).await.unwrap();

    info!("Seeded CPU table has {} entries", store.cpu_table().len());
    assert!(!store.cpu_table().is_empty());
    assert!(store.gpu_table().is_empty());
    assert!(store.deep_specs().is_none());
    assert!(store.lookup_cpu("intel core i7-13700h").is_some());
}

#[tokio::test]
async fn test_load_reads_snapshot_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());

    std::fs::write(
        config.cpu_snapshot_path(),
        r#"{"ranks": {"amd ryzen 7 7840hs": 71.0}}"#,
    )
    .unwrap();
    std::fs::write(
        config.gpu_snapshot_path(),
        r#"{"geforce rtx 4060 laptop gpu": 55.0}"#,
    )
    .unwrap();
    std::fs::write(
        config.deep_specs_path(),
        r#"{"gpus": {"geforce rtx 4060 laptop gpu": {"vram_gb": 8}}}"#,
    )
    .unwrap();

    let store = BenchmarkStore::load(&config).await.unwrap();
    assert_eq!(store.cpu_table().len(), 1);
    assert!(store.lookup_cpu("i7-13700h").is_none());
    assert_eq!(store.lookup_gpu("rtx 4060").unwrap().mark, 55.0);
    assert_eq!(
        store.deep_specs().unwrap().vram_gb("geforce rtx 4060 laptop gpu"),
        Some(8)
    );
}

#[tokio::test]
async fn test_corrupt_snapshot_is_an_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    std::fs::write(config.cpu_snapshot_path(), "{not json").unwrap();

    assert!(BenchmarkStore::load(&config).await.is_err());
}
