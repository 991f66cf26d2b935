//! Single-field parsers. Every function takes normalized text and falls back
//! to the empty value when nothing plausible is found.

use crate::types::PanelKind;
use regex::Regex;
use std::sync::LazyLock;

static TGP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2,3})\s*(?:w|watts?)\b").unwrap());
static REFRESH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{2,3})\s*hz").unwrap());
static IPS_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:ips|va|wva|uwva|ewv|sva|igzo|retina)\b").unwrap());
static RAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*(?:go|gb)\b").unwrap());
static STORAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(tb|to|t|gb|go)\b").unwrap());
static SSD_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ssd\s*(\d{3,4})\b").unwrap());
static NO_OS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sans\s+windows|sans\s+os|sans\s+syst[eè]me|freedos|\bno\s+os\b").unwrap()
});
static OS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:windows|win\s?1[01]|w1[01]|macos|chromeos|chrome\s?os)\b").unwrap()
});

const REFRESH_RANGE: std::ops::RangeInclusive<u32> = 60..=360;
const RAM_RANGE: std::ops::RangeInclusive<u32> = 8..=128;
const STORAGE_RANGE: std::ops::Range<u32> = 200..16000;

pub fn tgp_watts(text: &str) -> Option<u32> {
    TGP.captures(text).and_then(|c| c[1].parse().ok())
}

/// First refresh rate inside the plausible range, or 0.
pub fn refresh_hz(text: &str) -> u32 {
    REFRESH
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .find(|hz| REFRESH_RANGE.contains(hz))
        .unwrap_or(0)
}

pub fn panel_kind(text: &str) -> PanelKind {
    if text.contains("oled") {
        PanelKind::Oled
    } else if text.contains("mini led") || text.contains("mini-led") || text.contains("miniled") {
        PanelKind::MiniLed
    } else if IPS_LIKE.is_match(text) {
        PanelKind::Ips
    } else {
        PanelKind::None
    }
}

/// Largest plausible memory size mentioned, in GB.
pub fn ram_gb(text: &str) -> u32 {
    RAM.captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .filter(|gb| RAM_RANGE.contains(gb))
        .max()
        .unwrap_or(0)
}

pub fn ram_tier(gb: u32) -> u8 {
    match gb {
        g if g >= 48 => 3,
        g if g >= 24 => 2,
        g if g >= 16 => 1,
        _ => 0,
    }
}

pub fn storage_gb(text: &str) -> u32 {
    let best = STORAGE
        .captures_iter(text)
        .filter_map(|c| {
            let amount: f64 = c[1].replace(',', ".").parse().ok()?;
            let gb = if c[2].starts_with('g') {
                amount
            } else {
                amount * 1024.0
            };
            Some(gb as u32)
        })
        .filter(|gb| STORAGE_RANGE.contains(gb))
        .max();

    best.or_else(|| {
        SSD_BARE
            .captures_iter(text)
            .filter_map(|c| c[1].parse::<u32>().ok())
            .filter(|gb| (120..16000).contains(gb))
            .max()
    })
    .unwrap_or(0)
}

pub fn os_present(text: &str) -> bool {
    !NO_OS.is_match(text) && OS_NAME.is_match(text)
}
