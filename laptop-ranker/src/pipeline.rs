use crate::extract::extract_listing;
use crate::orchestrator::ScrapeOrchestrator;
use crate::types::{
    Category, Diagnostics, FetchMode, Listing, RankedItem, RankerError, Result, SearchRequest,
};
use crate::utils::keywords::KeywordSet;
use crate::valuation::{Profile, ScoreBreakdown, ValuationEngine};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Words that mark a listing as something other than a laptop.
pub const EXCLUDE_KEYWORDS: &[&str] = &[
    "iphone", "ipad", "smartphone", "tablette", "tablet", "moniteur", "monitor",
    "écran pc", "ecran pc", "imprimante", "printer", "lave-linge", "washing",
    "aspirateur", "vacuum", "fourchette", "fork", "cuiseur", "cooker",
    "réfrigérateur", "refrigerateur", "fridge", "chargeur standalone",
    "batterie externe", "power bank", "adaptateur seul", "dock seul", "hub seul",
    "mini cooper", "voiture",
];

/// Accessory words. Laptop titles also use them for the panel ("Écran 15,6")
/// or a bundle ("+ Sac"), so a matched CPU or GPU overrides them.
pub const ACCESSORY_KEYWORDS: &[&str] = &[
    "écran", "ecran", "souris", "mouse", "clavier", "keyboard", "casque", "headset",
    "webcam", "accessoire", "housse", "case", "sac", "bag", "câble", "cable",
    "support", "stand",
];

/// Words that mark a listing as a laptop in any category.
pub const LAPTOP_KEYWORDS: &[&str] = &[
    "laptop", "portable", "notebook", "pc portable", "ordinateur portable",
    "vivobook", "ideapad", "thinkpad", "legion", "nitro", "aspire", "pavilion",
    "envy", "spectre", "zenbook", "tuf", "rog", "predator", "katana", "raider",
    "cyborg", "creator", "swift", "chromebook", "surface laptop", "macbook",
    "inspiron", "latitude", "precision", "xps", "g15", "g16", "loq",
];

const GAMING_KEYWORDS: &[&str] = &["gaming", "gamer", "rtx", "geforce", "omen", "alienware"];
const WORK_KEYWORDS: &[&str] = &["professionnel", "business", "elitebook", "probook", "expertbook", "travelmate"];

/// Lower bound below which a listing is assumed to be an accessory.
pub fn price_floor(category: Category) -> f64 {
    match category {
        Category::Gaming => 400.0,
        Category::Work | Category::General => 200.0,
    }
}

/// Appends a segment hint unless the query already carries an equivalent term.
pub fn expand_query(query: &str, category: Category) -> String {
    let query = query.trim();
    let lowered = query.to_lowercase();
    let (terms, hint): (&[&str], &str) = match category {
        Category::Gaming => (&["rtx", "gtx", "gaming", "gamer"], "rtx"),
        Category::Work => (&["professionnel", "pro", "business", "thinkpad"], "professionnel"),
        Category::General => return query.to_string(),
    };
    if KeywordSet::new(terms.iter()).matches(&lowered) {
        query.to_string()
    } else if query.is_empty() {
        hint.to_string()
    } else {
        format!("{} {}", query, hint)
    }
}

/// One scored listing with the breakdown that produced its score.
#[derive(Debug, Clone)]
pub struct RankedListing {
    pub listing: Listing,
    pub breakdown: ScoreBreakdown,
}

impl RankedListing {
    pub fn score(&self) -> f64 {
        self.breakdown.score
    }

    /// The front-end shape. `rank` is 1-based.
    pub fn to_ranked_item(&self, rank: usize, include_breakdown: bool) -> RankedItem {
        let mut specs = Map::new();
        let spec = &self.breakdown.spec;
        specs.insert("cpu".to_string(), opt_string(spec.cpu_id.as_deref()));
        specs.insert("gpu".to_string(), opt_string(spec.gpu_id.as_deref()));
        specs.insert(
            "tgp_w".to_string(),
            spec.tgp_watts.map(Value::from).unwrap_or(Value::Null),
        );
        specs.insert("ram_tier".to_string(), Value::from(spec.ram_tier));
        specs.insert("storage_gb".to_string(), Value::from(spec.storage_gb));
        specs.insert("refresh_hz".to_string(), Value::from(spec.refresh_hz));
        specs.insert("panel".to_string(), Value::from(spec.panel_kind.as_str()));
        specs.insert("os".to_string(), Value::from(spec.os_present));

        RankedItem {
            rank,
            source: self.listing.source.clone(),
            country: self.listing.country.clone(),
            title: self.listing.title.clone(),
            price: self.listing.price,
            currency: self.listing.currency.clone(),
            url: self.listing.url.clone(),
            specs,
            score: self.breakdown.score,
            breakdown: include_breakdown.then(|| self.breakdown.to_json()),
        }
    }
}

fn opt_string(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

#[derive(Debug, Clone)]
pub struct RankingOutcome {
    /// The query actually sent to the sources.
    pub query: String,
    pub items: Vec<RankedListing>,
    pub diagnostics: Diagnostics,
}

impl RankingOutcome {
    pub fn to_ranked_items(&self, include_breakdown: bool) -> Vec<RankedItem> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| item.to_ranked_item(i + 1, include_breakdown))
            .collect()
    }
}

/// Top-level entry point: expand, fetch, filter, score, sort.
pub struct RankingPipeline {
    orchestrator: Arc<ScrapeOrchestrator>,
    engine: ValuationEngine,
    exclusions: KeywordSet,
    accessories: KeywordSet,
    laptop_words: Vec<&'static str>,
}

impl RankingPipeline {
    pub fn new(orchestrator: Arc<ScrapeOrchestrator>, engine: ValuationEngine) -> Self {
        Self {
            orchestrator,
            engine,
            exclusions: KeywordSet::new(EXCLUDE_KEYWORDS.iter()),
            accessories: KeywordSet::new(ACCESSORY_KEYWORDS.iter()),
            laptop_words: LAPTOP_KEYWORDS.to_vec(),
        }
    }

    pub fn orchestrator(&self) -> &ScrapeOrchestrator {
        &self.orchestrator
    }

    pub fn engine(&self) -> &ValuationEngine {
        &self.engine
    }

    fn allow_list(&self, category: Category) -> KeywordSet {
        let extra: &[&str] = match category {
            Category::Gaming => GAMING_KEYWORDS,
            Category::Work => WORK_KEYWORDS,
            Category::General => &[],
        };
        KeywordSet::new(self.laptop_words.iter().chain(extra.iter()))
    }

    /// Runs a full search. Fails only when every source came back empty.
    pub async fn rank(&self, request: &SearchRequest, mode: FetchMode) -> Result<RankingOutcome> {
        let query = expand_query(&request.query, request.category);
        info!(
            "Ranking '{}' (category={}, country={:?}, limit={})",
            query, request.category, request.country, request.limit
        );

        let fetched = self
            .orchestrator
            .fetch_with_report(&query, request.country.as_deref(), mode)
            .await;

        let mut diagnostics = Diagnostics {
            seen: fetched.seen,
            duplicates_dropped: fetched.duplicates_dropped,
            country_filtered: fetched.country_filtered,
            sources: fetched.sources,
            ..Diagnostics::default()
        };

        if fetched.listings.is_empty() {
            warn!("No listings from any source: {}", diagnostics);
            return Err(RankerError::NoResults { diagnostics });
        }

        let items = self.rank_listings(fetched.listings, request, &mut diagnostics);
        info!("Ranked {} listings for '{}': {}", items.len(), query, diagnostics);

        Ok(RankingOutcome {
            query,
            items,
            diagnostics,
        })
    }

    /// Filters, scores and orders already fetched listings. Equal scores keep
    /// their input order.
    pub fn rank_listings(
        &self,
        listings: Vec<Listing>,
        request: &SearchRequest,
        diagnostics: &mut Diagnostics,
    ) -> Vec<RankedListing> {
        let engine = self.engine.profiled(Profile::for_category(request.category));
        let allow = self.allow_list(request.category);
        let floor = price_floor(request.category).max(request.price_min.unwrap_or(0.0));
        let ceiling = request.price_max.unwrap_or(f64::INFINITY);

        let mut ranked = Vec::new();
        for listing in listings {
            if !(listing.price >= floor && listing.price <= ceiling) {
                debug!("[price] {} at {:.2}", listing.title, listing.price);
                diagnostics.dropped_by_price += 1;
                continue;
            }

            if let Some(word) = self.exclusions.first_match(&listing.title) {
                debug!("[exclude:{}] {}", word, listing.title);
                diagnostics.dropped_by_keyword += 1;
                continue;
            }

            let spec = extract_listing(&listing.title, &listing.specs_text());
            if !spec.has_processor_match() {
                if let Some(word) = self.accessories.first_match(&listing.title) {
                    debug!("[accessory:{}] {}", word, listing.title);
                    diagnostics.dropped_by_keyword += 1;
                    continue;
                }
            }

            if !allow.matches(&listing.title) && !spec.has_processor_match() {
                debug!("[not a laptop] {}", listing.title);
                diagnostics.dropped_by_keyword += 1;
                continue;
            }

            let breakdown = engine.evaluate(&spec, listing.price);
            ranked.push(RankedListing { listing, breakdown });
        }

        diagnostics.scored = ranked.len();
        ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
        ranked.truncate(request.limit);
        ranked
    }
}
