//! Free-text to canonical hardware matching.
//!
//! Extraction is a pure function of its input: no I/O, no shared state, and a
//! miss on any field yields that field's empty value.

pub mod cpu;
pub mod fields;
pub mod gpu;

pub use cpu::{match_cpu, CpuRule, CPU_RULES};
pub use gpu::{canonical_gpu, match_gpu, GpuRule, GPU_ALIASES, GPU_RULES};

use crate::types::CanonicalSpec;
use crate::utils::normalize_text;

/// Derives the hardware fingerprint of a product text.
pub fn extract(text: &str) -> CanonicalSpec {
    let t = normalize_text(text);
    CanonicalSpec {
        cpu_id: match_cpu(&t),
        gpu_id: match_gpu(&t),
        tgp_watts: fields::tgp_watts(&t),
        ram_tier: fields::ram_tier(fields::ram_gb(&t)),
        storage_gb: fields::storage_gb(&t),
        refresh_hz: fields::refresh_hz(&t),
        panel_kind: fields::panel_kind(&t),
        os_present: fields::os_present(&t),
    }
}

/// Title and raw specs text are matched as one document.
pub fn extract_listing(title: &str, specs_text: &str) -> CanonicalSpec {
    if specs_text.trim().is_empty() {
        extract(title)
    } else {
        extract(&format!("{} {}", title, specs_text))
    }
}
