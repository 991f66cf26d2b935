use crate::benchmarks::BenchmarkStore;
use crate::extract::extract_listing;
use crate::types::{CanonicalSpec, Category, PanelKind};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Assumed GPU power limit when the listing does not state one.
pub const DEFAULT_TGP_WATTS: u32 = 115;
/// Weight of one deep-spec bonus point relative to the other components.
pub const DEEP_BONUS_WEIGHT: f64 = 0.05;

/// Maps a GPU power limit, clamped to [60, 140] W, onto [0.84, 1.12].
pub fn tgp_factor(tgp_watts: Option<u32>) -> f64 {
    let tgp = tgp_watts.unwrap_or(DEFAULT_TGP_WATTS).clamp(60, 140) as f64;
    0.84 + (tgp - 60.0) * (0.28 / 80.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Gaming,
    Work,
}

impl Profile {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Work => Profile::Work,
            Category::Gaming | Category::General => Profile::Gaming,
        }
    }

    pub fn weights(&self) -> &'static ProfileWeights {
        match self {
            Profile::Gaming => &GAMING_WEIGHTS,
            Profile::Work => &WORK_WEIGHTS,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Gaming => f.write_str("gaming"),
            Profile::Work => f.write_str("work"),
        }
    }
}

/// Coefficients and stepped bonuses of one scoring profile. Step tables are
/// ordered from the highest threshold down.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileWeights {
    pub cpu: f64,
    pub gpu: f64,
    pub display: f64,
    pub ram: f64,
    pub os_bonus: f64,
    pub oled: f64,
    pub miniled: f64,
    pub ips: f64,
    pub refresh_steps: [(u32, f64); 4],
    pub storage_steps: [(u32, f64); 4],
    pub penalty_base: f64,
    pub price_floor: f64,
}

pub const GAMING_WEIGHTS: ProfileWeights = ProfileWeights {
    cpu: 5.0,
    gpu: 4.0,
    display: 1.5,
    ram: 1.0,
    os_bonus: 0.2,
    oled: 1.0,
    miniled: 0.7,
    ips: 0.3,
    refresh_steps: [(240, 0.7), (165, 0.5), (144, 0.4), (120, 0.2)],
    storage_steps: [(2000, 0.5), (1000, 0.35), (512, 0.2), (256, 0.1)],
    penalty_base: 1.7,
    price_floor: 300.0,
};

pub const WORK_WEIGHTS: ProfileWeights = ProfileWeights {
    cpu: 6.0,
    gpu: 0.5,
    display: 1.8,
    ram: 1.2,
    os_bonus: 0.2,
    oled: 1.0,
    miniled: 0.8,
    ips: 0.4,
    refresh_steps: [(240, 0.3), (165, 0.25), (144, 0.2), (120, 0.15)],
    storage_steps: [(2000, 0.6), (1000, 0.45), (512, 0.25), (256, 0.1)],
    penalty_base: 1.75,
    price_floor: 250.0,
};

fn step_bonus(value: u32, steps: &[(u32, f64)]) -> f64 {
    steps
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

impl ProfileWeights {
    pub fn panel_bonus(&self, panel: PanelKind) -> f64 {
        match panel {
            PanelKind::Oled => self.oled,
            PanelKind::MiniLed => self.miniled,
            PanelKind::Ips => self.ips,
            PanelKind::None => 0.0,
        }
    }

    pub fn display_raw(&self, panel: PanelKind, refresh_hz: u32) -> f64 {
        self.panel_bonus(panel) + step_bonus(refresh_hz, &self.refresh_steps)
    }

    pub fn storage_bonus(&self, storage_gb: u32) -> f64 {
        step_bonus(storage_gb, &self.storage_steps)
    }

    /// `log_base(max(price, floor))`, always > 1.
    pub fn price_penalty(&self, price: f64) -> f64 {
        price.max(self.price_floor).ln() / self.penalty_base.ln()
    }
}

/// A component's input value and what it added to the raw total.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Component {
    pub raw: f64,
    pub weighted: f64,
}

impl Component {
    fn new(raw: f64, weighted: f64) -> Self {
        Self { raw, weighted }
    }
}

/// Outcome of the optional VRAM / core-count bonus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentStatus {
    Applied {
        vram_gb: Option<u32>,
        cores: Option<u32>,
        points: f64,
    },
    NotFound,
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub profile: Profile,
    pub spec: CanonicalSpec,
    pub cpu: Component,
    pub gpu: Component,
    pub tgp_factor: f64,
    pub display: Component,
    pub ram: Component,
    pub storage: Component,
    pub os: Component,
    pub deep_bonus: Component,
    pub enrichment: EnrichmentStatus,
    pub raw_total: f64,
    pub price: f64,
    pub penalty: f64,
    pub score: f64,
}

impl ScoreBreakdown {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// VRAM points: +15 / +10 / +5 for 16 / 12 / 8 GB and up, -5 under 6 GB.
pub fn vram_points(vram_gb: u32) -> f64 {
    match vram_gb {
        v if v >= 16 => 15.0,
        v if v >= 12 => 10.0,
        v if v >= 8 => 5.0,
        v if v < 6 => -5.0,
        _ => 0.0,
    }
}

/// Core points: +8 / +5 / +2 for 14 / 10 / 8 cores and up, -5 under 6.
pub fn core_points(cores: u32) -> f64 {
    match cores {
        c if c >= 14 => 8.0,
        c if c >= 10 => 5.0,
        c if c >= 8 => 2.0,
        c if c < 6 => -5.0,
        _ => 0.0,
    }
}

/// Combines extracted specs, benchmark marks and price into a value score.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    store: Arc<BenchmarkStore>,
    profile: Profile,
}

impl ValuationEngine {
    pub fn new(store: Arc<BenchmarkStore>) -> Self {
        Self {
            store,
            profile: Profile::Gaming,
        }
    }

    pub fn profiled(&self, profile: Profile) -> Self {
        Self {
            store: Arc::clone(&self.store),
            profile,
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn store(&self) -> &BenchmarkStore {
        &self.store
    }

    pub fn score(&self, title: &str, specs_text: &str, price: f64) -> f64 {
        self.breakdown(title, specs_text, price).score
    }

    pub fn breakdown(&self, title: &str, specs_text: &str, price: f64) -> ScoreBreakdown {
        self.evaluate(&extract_listing(title, specs_text), price)
    }

    /// Scores an already extracted spec.
    pub fn evaluate(&self, spec: &CanonicalSpec, price: f64) -> ScoreBreakdown {
        let w = self.profile.weights();

        let cpu_mark = spec
            .cpu_id
            .as_deref()
            .and_then(|id| self.store.lookup_cpu(id))
            .map(|e| e.mark)
            .unwrap_or(0.0);
        let factor = tgp_factor(spec.tgp_watts);
        let gpu_mark = spec
            .gpu_id
            .as_deref()
            .and_then(|id| self.store.lookup_gpu(id))
            .map(|e| e.mark * factor)
            .unwrap_or(0.0);

        let cpu = Component::new(cpu_mark, w.cpu * cpu_mark / 100.0);
        let gpu = Component::new(gpu_mark, w.gpu * gpu_mark / 100.0);
        let display_raw = w.display_raw(spec.panel_kind, spec.refresh_hz);
        let display = Component::new(display_raw, w.display * display_raw);
        let ram = Component::new(spec.ram_tier as f64, w.ram * spec.ram_tier as f64);
        let storage = Component::new(spec.storage_gb as f64, w.storage_bonus(spec.storage_gb));
        let os = if spec.os_present {
            Component::new(1.0, w.os_bonus)
        } else {
            Component::default()
        };

        let (enrichment, points) = self.deep_bonus(spec);
        let deep_bonus = Component::new(points, points * DEEP_BONUS_WEIGHT);

        // Kept non-negative so a higher price can never raise the score.
        let raw_total = (cpu.weighted
            + gpu.weighted
            + display.weighted
            + ram.weighted
            + storage.weighted
            + os.weighted
            + deep_bonus.weighted)
            .max(0.0);
        let penalty = w.price_penalty(price);

        ScoreBreakdown {
            profile: self.profile,
            spec: spec.clone(),
            cpu,
            gpu,
            tgp_factor: factor,
            display,
            ram,
            storage,
            os,
            deep_bonus,
            enrichment,
            raw_total,
            price,
            penalty,
            score: raw_total / penalty,
        }
    }

    fn deep_bonus(&self, spec: &CanonicalSpec) -> (EnrichmentStatus, f64) {
        let Some(deep) = self.store.deep_specs() else {
            return (
                EnrichmentStatus::Skipped {
                    reason: "no deep spec table loaded".to_string(),
                },
                0.0,
            );
        };
        if !spec.has_processor_match() {
            return (
                EnrichmentStatus::Skipped {
                    reason: "no cpu or gpu identified".to_string(),
                },
                0.0,
            );
        }

        let vram_gb = spec.gpu_id.as_deref().and_then(|g| deep.vram_gb(g));
        let cores = spec.cpu_id.as_deref().and_then(|c| deep.cores(c));
        if vram_gb.is_none() && cores.is_none() {
            return (EnrichmentStatus::NotFound, 0.0);
        }

        let points = vram_gb.map(vram_points).unwrap_or(0.0) + cores.map(core_points).unwrap_or(0.0);
        (
            EnrichmentStatus::Applied {
                vram_gb,
                cores,
                points,
            },
            points,
        )
    }
}
