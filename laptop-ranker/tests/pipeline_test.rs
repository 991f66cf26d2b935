use async_trait::async_trait;
use laptop_ranker::benchmarks::{BenchmarkStore, BenchmarkTable};
use laptop_ranker::types::{Category, FetchMode, Listing, RankerError, Result, SearchRequest};
use laptop_ranker::{
    RankingPipeline, ResultCache, ScrapeConfig, ScrapeOrchestrator, SourceAdapter,
    SourceMetadata, ValuationEngine,
};
use std::sync::{Arc, Mutex, Once};
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

/// Returns a fixed list and remembers the queries it was asked.
struct FixedSource {
    listings: Option<Vec<Listing>>,
    queries: Mutex<Vec<String>>,
}

impl FixedSource {
    fn new(listings: Vec<Listing>) -> Arc<Self> {
        Arc::new(Self {
            listings: Some(listings),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            listings: None,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SourceAdapter for FixedSource {
    fn source_id(&self) -> String {
        "fixed".to_string()
    }

    fn source_name(&self) -> String {
        "Fixed".to_string()
    }

    fn country(&self) -> String {
        "FR".to_string()
    }

    async fn search(&self, query: &str, _page: u32) -> Result<Vec<Listing>> {
        self.queries.lock().unwrap().push(query.to_string());
        self.listings
            .clone()
            .ok_or_else(|| RankerError::Browser("connection reset".to_string()))
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            id: self.source_id(),
            name: self.source_name(),
            country: self.country(),
            website_url: None,
            max_pages: 1,
            tags: Vec::new(),
        }
    }
}

fn store() -> Arc<BenchmarkStore> {
    Arc::new(BenchmarkStore::new(
        BenchmarkTable::from_pairs(&[("i5-12500h", 40.0), ("i7-13700hx", 90.0), ("i9-14900hx", 99.0)]),
        BenchmarkTable::from_pairs(&[
            ("geforce rtx 4050 laptop gpu", 30.0),
            ("geforce rtx 4070 laptop gpu", 95.0),
            ("geforce rtx 4090 laptop gpu", 100.0),
        ]),
    ))
}

fn fr(title: &str, price: f64, url: &str) -> Listing {
    Listing::new("Fixed", "FR", title, price, url)
}

fn pipeline_with(source: Arc<FixedSource>, dir: &std::path::Path) -> RankingPipeline {
    let mut orchestrator =
        ScrapeOrchestrator::new(Arc::new(ResultCache::new(dir)), &ScrapeConfig::instant());
    orchestrator.register(source);
    RankingPipeline::new(Arc::new(orchestrator), ValuationEngine::new(store()))
}

#[tokio::test]
async fn test_price_ceiling_and_score_order() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = FixedSource::new(vec![
        fr("PC Portable Gamer i5-12500H RTX 4050 16Go 512Go", 800.0, "https://shop.example/a"),
        fr("PC Portable Gamer i7-13700HX RTX 4070 16Go 512Go", 1200.0, "https://shop.example/b"),
        fr("PC Portable Gamer i9-14900HX RTX 4090 16Go 512Go", 2000.0, "https://shop.example/c"),
    ]);
    let pipeline = pipeline_with(source.clone(), dir.path());

    let request = SearchRequest::new("pc portable", Category::Gaming)
        .with_price_range(None, Some(1500.0));
    let outcome = pipeline.rank(&request, FetchMode::ForceRefresh).await.unwrap();
    info!("Diagnostics: {}", outcome.diagnostics);

    assert_eq!(outcome.query, "pc portable rtx");
    assert_eq!(source.queries.lock().unwrap().as_slice(), ["pc portable rtx"]);

    let prices: Vec<f64> = outcome.items.iter().map(|i| i.listing.price).collect();
    assert_eq!(prices, vec![1200.0, 800.0]);
    assert!(outcome.items[0].score() > outcome.items[1].score());
    assert_eq!(outcome.diagnostics.dropped_by_price, 1);
    assert_eq!(outcome.diagnostics.scored, 2);
}

#[tokio::test]
async fn test_keyword_and_floor_filters() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = FixedSource::new(vec![
        fr("Souris gamer RGB compatible RTX", 59.99, "https://shop.example/mouse"),
        fr("Sac à dos pour PC portable gamer 17 pouces", 449.0, "https://shop.example/bag"),
        fr("Bureau d'angle noir XXL", 450.0, "https://shop.example/desk"),
        fr("Lenovo Legion 5 Ryzen 7 7840HS", 1099.0, "https://shop.example/legion"),
        fr("Medion Erazer i7-13700HX 16Go", 1299.0, "https://shop.example/medion"),
        fr("Lenovo Legion Pro standard edition", 1399.0, "https://shop.example/legion-pro"),
    ]);
    let pipeline = pipeline_with(source, dir.path());

    let request = SearchRequest::new("pc portable gamer", Category::Gaming);
    let outcome = pipeline.rank(&request, FetchMode::ForceRefresh).await.unwrap();

    let titles: Vec<&str> = outcome.items.iter().map(|i| i.listing.title.as_str()).collect();
    assert_eq!(titles.len(), 3, "{:?}", titles);
    // matched by CPU/GPU although no laptop keyword is present
    assert!(titles.contains(&"Medion Erazer i7-13700HX 16Go"));
    // "standard" is not the excluded word "stand"
    assert!(titles.contains(&"Lenovo Legion Pro standard edition"));
    assert_eq!(outcome.diagnostics.dropped_by_price, 1);
    assert_eq!(outcome.diagnostics.dropped_by_keyword, 2);
}

#[tokio::test]
async fn test_retailer_titles_mentioning_screen_or_bundle_survive() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let laptops = [
        "PC Portable Gamer ASUS TUF Gaming A15 - Ryzen 7 7435HS - RTX 4050 - 16Go - 512Go SSD - Écran 15,6\" FHD 144Hz",
        "Lenovo LOQ 15IAX9 i5-12450HX RTX 3050 16Go 512Go Écran 15,6\" 144Hz + Sac à dos",
        "MSI Thin GF63 i5-12450H RTX 2050 8Go 512Go avec Support ventilé offert",
    ];
    let source = FixedSource::new(vec![
        fr(laptops[0], 899.0, "https://www.cdiscount.com/f-1-tuf.html"),
        fr(laptops[1], 749.0, "https://www.fnac.com/a2/loq"),
        fr(laptops[2], 649.0, "https://www.darty.com/nav/3"),
        fr("Souris gamer sans fil Logitech G Pro X Superlight 2", 229.0, "https://www.fnac.com/a4/souris"),
        fr("Housse PC portable 15,6 pouces cuir premium", 219.0, "https://www.darty.com/nav/5"),
        fr("Écran PC Gamer Samsung Odyssey G5 27\" 165Hz", 299.0, "https://www.cdiscount.com/f-6-ecr.html"),
    ]);
    let pipeline = pipeline_with(source, dir.path());

    let request = SearchRequest::new("pc portable", Category::General);
    let outcome = pipeline.rank(&request, FetchMode::ForceRefresh).await.unwrap();

    let titles: Vec<&str> = outcome.items.iter().map(|i| i.listing.title.as_str()).collect();
    assert_eq!(titles.len(), 3, "{:?}", titles);
    for laptop in laptops {
        assert!(titles.contains(&laptop), "missing {}", laptop);
    }
    assert_eq!(outcome.diagnostics.dropped_by_price, 0);
    assert_eq!(outcome.diagnostics.dropped_by_keyword, 3);
}

#[tokio::test]
async fn test_limit_ties_and_output_shape() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = FixedSource::new(vec![
        fr("PC Portable Gamer i7-13700HX RTX 4070", 1200.0, "https://shop.example/first"),
        fr("PC Portable Gamer i7-13700HX RTX 4070", 1200.0, "https://shop.example/second"),
        fr("PC Portable Gamer i7-13700HX RTX 4070", 1200.0, "https://shop.example/third"),
    ]);
    let pipeline = pipeline_with(source, dir.path());

    let request = SearchRequest::new("rtx 4070", Category::Gaming).with_limit(2);
    let outcome = pipeline.rank(&request, FetchMode::ForceRefresh).await.unwrap();

    let urls: Vec<&str> = outcome.items.iter().map(|i| i.listing.url.as_str()).collect();
    assert_eq!(urls, ["https://shop.example/first", "https://shop.example/second"]);
    assert_eq!(outcome.diagnostics.scored, 3);

    let items = outcome.to_ranked_items(true);
    assert_eq!(items[0].rank, 1);
    assert_eq!(items[1].rank, 2);
    assert_eq!(items[0].specs["gpu"], "geforce rtx 4070 laptop gpu");
    assert_eq!(items[0].specs["cpu"], "i7-13700hx");
    assert!(items[0].breakdown.as_ref().unwrap().get("penalty").is_some());
    assert!(outcome.to_ranked_items(false)[0].breakdown.is_none());

    let json = serde_json::to_value(&items[0]).unwrap();
    for key in ["rank", "source", "country", "title", "price", "currency", "url", "specs", "score"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}

#[tokio::test]
async fn test_work_category_uses_work_profile() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = FixedSource::new(vec![
        fr("Ordinateur portable i5-12500H 16Go 512Go", 300.0, "https://shop.example/office"),
    ]);
    let pipeline = pipeline_with(source.clone(), dir.path());

    let request = SearchRequest::new("ordinateur portable", Category::Work);
    let outcome = pipeline.rank(&request, FetchMode::ForceRefresh).await.unwrap();

    assert_eq!(outcome.query, "ordinateur portable professionnel");
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(
        outcome.items[0].breakdown.profile,
        laptop_ranker::Profile::Work
    );
}

#[tokio::test]
async fn test_all_sources_empty_is_no_results() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_with(FixedSource::failing(), dir.path());

    let request = SearchRequest::new("pc portable", Category::General);
    match pipeline.rank(&request, FetchMode::ForceRefresh).await {
        Err(RankerError::NoResults { diagnostics }) => {
            assert_eq!(diagnostics.seen, 0);
            assert_eq!(diagnostics.sources.len(), 1);
            assert!(diagnostics.sources[0].is_failure());
        }
        other => panic!("expected NoResults, got {:?}", other.map(|o| o.items.len())),
    }
}

#[tokio::test]
async fn test_everything_filtered_is_an_empty_ranking() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = FixedSource::new(vec![fr("Housse PC portable 15 pouces", 19.99, "https://shop.example/case")]);
    let pipeline = pipeline_with(source, dir.path());

    let request = SearchRequest::new("pc portable", Category::General);
    let outcome = pipeline.rank(&request, FetchMode::ForceRefresh).await.unwrap();
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.diagnostics.seen, 1);
    assert_eq!(outcome.diagnostics.dropped_by_price, 1);
}
