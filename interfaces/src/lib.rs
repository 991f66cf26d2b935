pub mod defs;

pub use defs::{Category, FetchMode, RankedItem, SearchRequest, SnapshotFile};
