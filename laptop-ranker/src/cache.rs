use crate::types::{Listing, Result, SnapshotFile};
use crate::utils::slugify;
use chrono::{Duration, Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Disk-backed listing snapshots, one JSON file per (query, source, day):
/// `<root>/<YYYY-MM-DD>/<query-slug>__<source-slug>.json`.
#[derive(Debug, Clone)]
pub struct ResultCache {
    root: PathBuf,
}

impl ResultCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn path_for(&self, query: &str, source: &str, date: NaiveDate) -> PathBuf {
        self.root
            .join(date.format("%Y-%m-%d").to_string())
            .join(format!("{}__{}.json", slugify(query), slugify(source)))
    }

    /// Replaces the snapshot for this key wholesale.
    pub async fn save(
        &self,
        query: &str,
        source: &str,
        date: NaiveDate,
        listings: &[Listing],
    ) -> Result<PathBuf> {
        let path = self.path_for(query, source, date);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let snapshot = SnapshotFile {
            query: query.to_string(),
            source: source.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            items: listings.to_vec(),
        };
        let body = serde_json::to_string_pretty(&snapshot)?;

        // Readers never observe a partially written snapshot.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Cached {} listings at {}", listings.len(), path.display());
        Ok(path)
    }

    /// `None` when the file is missing, unreadable, malformed or empty.
    pub async fn load(&self, query: &str, source: &str, date: NaiveDate) -> Option<Vec<Listing>> {
        let path = self.path_for(query, source, date);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Unreadable cache file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<SnapshotFile<Listing>>(&raw) {
            Ok(snapshot) if !snapshot.items.is_empty() => Some(snapshot.items),
            Ok(_) => None,
            Err(e) => {
                warn!("Corrupt cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Newest snapshot within `lookback_days` of today.
    pub async fn load_latest(
        &self,
        query: &str,
        source: &str,
        lookback_days: u32,
    ) -> Option<(NaiveDate, Vec<Listing>)> {
        self.load_latest_from(Self::today(), query, source, lookback_days)
            .await
    }

    /// Walks back from `from` through `lookback_days` earlier days.
    pub async fn load_latest_from(
        &self,
        from: NaiveDate,
        query: &str,
        source: &str,
        lookback_days: u32,
    ) -> Option<(NaiveDate, Vec<Listing>)> {
        for offset in 0..=lookback_days {
            let date = from - Duration::days(offset as i64);
            if let Some(items) = self.load(query, source, date).await {
                return Some((date, items));
            }
        }
        None
    }
}
