use crate::config::AppConfig;
use crate::extract::{match_cpu, match_gpu};
use crate::types::{RankerError, Result};
use crate::utils::normalize_text;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Built-in laptop CPU marks used when no snapshot has been ingested yet.
pub const FALLBACK_CPU_RANKS: &[(&str, f64)] = &[
    ("i9-14900hx", 89.0),
    ("i7-14700hx", 83.0),
    ("i7-14700h", 71.0),
    ("i9-13900hx", 79.0),
    ("i9-13900h", 73.0),
    ("i7-13700hx", 71.0),
    ("i7-13700h", 67.0),
    ("i7-13650hx", 67.0),
    ("i7-13620h", 59.0),
    ("i5-13500h", 56.0),
    ("i5-13420h", 50.0),
    ("ultra 9 185h", 76.0),
    ("ultra 7 155h", 69.0),
    ("ultra 5 125h", 57.0),
    ("ryzen 9 7945hx", 92.0),
    ("ryzen 7 7845hx", 79.0),
    ("ryzen 9 7940hs", 77.0),
    ("ryzen 7 7840hs", 71.0),
    ("ryzen 7 8845hs", 75.0),
    ("ryzen 7 8840hs", 73.0),
    ("ryzen 7 7735hs", 59.0),
    ("ryzen 5 7535hs", 53.0),
    ("i9-12900hx", 71.0),
    ("i9-12900h", 67.0),
    ("i7-12800h", 63.0),
    ("i7-12700h", 59.0),
    ("i7-12650h", 54.0),
    ("i5-12500h", 50.0),
    ("ryzen 9 6900hx", 62.0),
    ("ryzen 7 6800h", 57.0),
    ("ryzen 5 6600h", 47.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub name: String,
    pub mark: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl BenchmarkEntry {
    pub fn new(name: impl Into<String>, mark: f64) -> Self {
        Self {
            name: name.into(),
            mark,
            price: None,
            rank: None,
        }
    }
}

/// Accepted on-disk shapes of a benchmark table, tried in this order.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotShape {
    Wrapped {
        ranks: HashMap<String, f64>,
    },
    Entries {
        entries: Vec<BenchmarkEntry>,
    },
    Flat(HashMap<String, f64>),
}

/// Exact case-insensitive hit first; otherwise the shortest name related to
/// the query by containment (either direction), higher mark breaking ties.
fn best_match<'a, T, I, F>(items: I, query: &str, mark: F) -> Option<&'a T>
where
    I: Iterator<Item = (&'a str, &'a T)> + Clone,
    F: Fn(&T) -> f64,
{
    let q = normalize_text(query);
    if q.is_empty() {
        return None;
    }
    if let Some((_, exact)) = items.clone().find(|(name, _)| *name == q) {
        return Some(exact);
    }
    items
        .filter(|(name, _)| name.contains(q.as_str()) || q.contains(*name))
        .min_by(|(a_name, a), (b_name, b)| {
            a_name
                .len()
                .cmp(&b_name.len())
                .then_with(|| mark(b).total_cmp(&mark(a)))
        })
        .map(|(_, item)| item)
}

/// One read-only name-to-mark table.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkTable {
    entries: Vec<BenchmarkEntry>,
}

impl BenchmarkTable {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = BenchmarkEntry>,
    {
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut kept: Vec<BenchmarkEntry> = Vec::new();
        for mut entry in entries {
            entry.name = normalize_text(&entry.name);
            if entry.name.is_empty() {
                continue;
            }
            match by_name.get(&entry.name) {
                Some(&idx) => kept[idx] = entry,
                None => {
                    by_name.insert(entry.name.clone(), kept.len());
                    kept.push(entry);
                }
            }
        }
        Self { entries: kept }
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self::from_entries(
            pairs
                .iter()
                .map(|(name, mark)| BenchmarkEntry::new(*name, *mark)),
        )
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let shape: SnapshotShape = serde_json::from_str(raw)
            .map_err(|e| RankerError::Snapshot(format!("unrecognized table layout: {}", e)))?;
        let entries = match shape {
            SnapshotShape::Wrapped { ranks } | SnapshotShape::Flat(ranks) => ranks
                .into_iter()
                .map(|(name, mark)| BenchmarkEntry::new(name, mark))
                .collect(),
            SnapshotShape::Entries { entries } => entries,
        };
        Ok(Self::from_entries(entries))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&raw)
    }

    pub fn lookup(&self, query: &str) -> Option<&BenchmarkEntry> {
        best_match(
            self.entries.iter().map(|e| (e.name.as_str(), e)),
            query,
            |e| e.mark,
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkEntry> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GpuDetails {
    #[serde(default, alias = "memory_size_gb", alias = "vram")]
    vram_gb: Option<Count>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CpuDetails {
    #[serde(default)]
    cores: Option<Count>,
}

/// Counts come in as numbers or as text such as "8 GB" or "n/a".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(f64),
    Text(String),
}

impl Count {
    fn value(&self) -> Option<u32> {
        match self {
            Count::Number(n) if *n >= 0.0 => Some(*n as u32),
            Count::Number(_) => None,
            Count::Text(s) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .skip_while(|c| !c.is_ascii_digit())
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse().ok()
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DeepSpecFile {
    #[serde(default)]
    gpus: HashMap<String, GpuDetails>,
    #[serde(default)]
    cpus: HashMap<String, CpuDetails>,
}

/// VRAM sizes and core counts keyed by canonical hardware name.
#[derive(Debug, Clone, Default)]
pub struct DeepSpecTable {
    vram: Vec<(String, u32)>,
    cores: Vec<(String, u32)>,
}

impl DeepSpecTable {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: DeepSpecFile = serde_json::from_str(raw)
            .map_err(|e| RankerError::Snapshot(format!("deep spec table: {}", e)))?;
        let vram = file
            .gpus
            .into_iter()
            .filter_map(|(name, d)| Some((normalize_text(&name), d.vram_gb?.value()?)))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        let cores = file
            .cpus
            .into_iter()
            .filter_map(|(name, d)| Some((normalize_text(&name), d.cores?.value()?)))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Ok(Self { vram, cores })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&raw)
    }

    pub fn with_vram(mut self, gpu: &str, vram_gb: u32) -> Self {
        self.vram.push((normalize_text(gpu), vram_gb));
        self
    }

    pub fn with_cores(mut self, cpu: &str, cores: u32) -> Self {
        self.cores.push((normalize_text(cpu), cores));
        self
    }

    pub fn vram_gb(&self, gpu: &str) -> Option<u32> {
        best_match(self.vram.iter().map(|(n, v)| (n.as_str(), v)), gpu, |v| *v as f64).copied()
    }

    pub fn cores(&self, cpu: &str) -> Option<u32> {
        best_match(self.cores.iter().map(|(n, c)| (n.as_str(), c)), cpu, |c| *c as f64).copied()
    }
}

/// Read-only CPU/GPU benchmark lookup, built once at startup and shared
/// behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkStore {
    cpu: BenchmarkTable,
    gpu: BenchmarkTable,
    deep: Option<DeepSpecTable>,
}

impl BenchmarkStore {
    pub fn new(cpu: BenchmarkTable, gpu: BenchmarkTable) -> Self {
        Self {
            cpu,
            gpu,
            deep: None,
        }
    }

    /// Only the built-in CPU fallback table, no GPU marks.
    pub fn seeded() -> Self {
        Self::new(
            BenchmarkTable::from_pairs(FALLBACK_CPU_RANKS),
            BenchmarkTable::default(),
        )
    }

    pub fn with_deep_specs(mut self, deep: DeepSpecTable) -> Self {
        self.deep = Some(deep);
        self
    }

    /// Loads the snapshot files named by the config. A missing CPU table falls
    /// back to the seeded marks; a missing GPU or deep-spec table stays empty.
    /// A file that exists but cannot be parsed is an error.
    pub async fn load(config: &AppConfig) -> Result<Self> {
        let cpu = match load_optional(&config.cpu_snapshot_path()).await? {
            Some(table) => table,
            None => {
                warn!(
                    "No CPU snapshot at {}, using built-in fallback marks",
                    config.cpu_snapshot_path().display()
                );
                BenchmarkTable::from_pairs(FALLBACK_CPU_RANKS)
            }
        };
        let gpu = match load_optional(&config.gpu_snapshot_path()).await? {
            Some(table) => table,
            None => {
                warn!(
                    "No GPU snapshot at {}, GPU marks will be zero",
                    config.gpu_snapshot_path().display()
                );
                BenchmarkTable::default()
            }
        };

        let deep_path = config.deep_specs_path();
        let deep = if tokio::fs::try_exists(&deep_path).await.unwrap_or(false) {
            Some(DeepSpecTable::load(&deep_path).await?)
        } else {
            None
        };

        info!(
            "Loaded benchmark tables: {} CPUs, {} GPUs, deep specs: {}",
            cpu.len(),
            gpu.len(),
            deep.is_some()
        );
        Ok(Self { cpu, gpu, deep })
    }

    /// Accepts a canonical id or raw text; raw text is canonicalized first.
    pub fn lookup_cpu(&self, name: &str) -> Option<&BenchmarkEntry> {
        let normalized = normalize_text(name);
        let key = match_cpu(&normalized).unwrap_or(normalized);
        self.cpu.lookup(&key)
    }

    pub fn lookup_gpu(&self, name: &str) -> Option<&BenchmarkEntry> {
        let normalized = normalize_text(name);
        let key = match_gpu(&normalized).unwrap_or(normalized);
        self.gpu.lookup(&key)
    }

    pub fn deep_specs(&self) -> Option<&DeepSpecTable> {
        self.deep.as_ref()
    }

    pub fn cpu_table(&self) -> &BenchmarkTable {
        &self.cpu
    }

    pub fn gpu_table(&self) -> &BenchmarkTable {
        &self.gpu
    }
}

async fn load_optional(path: &Path) -> Result<Option<BenchmarkTable>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    BenchmarkTable::load(path).await.map(Some)
}
