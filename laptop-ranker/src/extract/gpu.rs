use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Short forms mapped to the exact keys used by the GPU benchmark table.
pub const GPU_ALIASES: &[(&str, &str)] = &[
    ("rtx 5090", "geforce rtx 5090 laptop gpu"),
    ("rtx 5080", "geforce rtx 5080 laptop gpu"),
    ("rtx 5070 ti", "geforce rtx 5070 ti laptop gpu"),
    ("rtx 5070", "geforce rtx 5070 laptop gpu"),
    ("rtx 5060", "geforce rtx 5060 laptop gpu"),
    ("rtx 5050", "geforce rtx 5050 laptop gpu"),
    ("rtx 4090", "geforce rtx 4090 laptop gpu"),
    ("rtx 4080", "geforce rtx 4080 laptop gpu"),
    ("rtx 4070", "geforce rtx 4070 laptop gpu"),
    ("rtx 4060", "geforce rtx 4060 laptop gpu"),
    ("rtx 4050", "geforce rtx 4050 laptop gpu"),
    ("rtx 3080 ti", "geforce rtx 3080 ti laptop gpu"),
    ("rtx 3080", "geforce rtx 3080 laptop gpu"),
    ("rtx 3070 ti", "geforce rtx 3070 ti laptop gpu"),
    ("rtx 3070", "geforce rtx 3070 laptop gpu"),
    ("rtx 3060", "geforce rtx 3060 laptop gpu"),
    ("rtx 3050 ti", "geforce rtx 3050 ti laptop gpu"),
    ("rtx 3050 6gb", "geforce rtx 3050 6gb laptop gpu"),
    ("rtx 3050 4gb", "geforce rtx 3050 4gb laptop gpu"),
    ("rtx 3050 a", "geforce rtx 3050 a laptop gpu"),
    ("rtx 5000 ada generation", "rtx 5000 ada generation laptop gpu"),
    ("rtx 4000 ada generation", "rtx 4000 ada generation laptop gpu"),
    ("rtx 3500 ada generation", "rtx 3500 ada generation laptop gpu"),
    ("rtx 3000 ada generation", "rtx 3000 ada generation laptop gpu"),
    ("rtx 2000 ada generation", "rtx 2000 ada generation laptop gpu"),
    ("rtx 1000 ada generation", "rtx 1000 ada generation laptop gpu"),
    ("rtx pro 3000 blackwell generation", "rtx pro 3000 blackwell generation laptop gpu"),
    ("rtx pro 2000 blackwell generation", "rtx pro 2000 blackwell generation laptop gpu"),
    ("rtx pro 1000 blackwell generation", "rtx pro 1000 blackwell generation laptop gpu"),
    ("rtx pro 500 blackwell generation", "rtx pro 500 blackwell generation laptop gpu"),
    ("rtx a5500", "rtx a5500 laptop gpu"),
    ("rtx a5000", "rtx a5000 laptop gpu"),
    ("rtx a4500", "rtx a4500 laptop gpu"),
    ("rtx a4000", "rtx a4000 laptop gpu"),
    ("rtx a3000 12gb", "rtx a3000 12gb laptop gpu"),
    ("rtx a3000", "rtx a3000 laptop gpu"),
    ("rtx a2000 8gb", "rtx a2000 8gb laptop gpu"),
    ("rtx a2000", "rtx a2000 laptop gpu"),
    ("rtx a1000 6gb", "rtx a1000 6gb laptop gpu"),
    ("rtx a1000", "rtx a1000 laptop gpu"),
    ("rx 7900m", "radeon rx 7900m"),
    ("rx 7800m", "radeon rx 7800m"),
    ("rx 7600m xt", "radeon rx 7600m xt"),
    ("rx 7600m", "radeon rx 7600m"),
    ("rx 7600s", "radeon rx 7600s"),
    ("rx 6850m xt", "radeon rx 6850m xt"),
    ("rx 6850m", "radeon rx 6850m"),
    ("rx 6800m", "radeon rx 6800m"),
    ("rx 6800s", "radeon rx 6800s"),
    ("rx 6700m", "radeon rx 6700m"),
    ("rx 6700s", "radeon rx 6700s"),
    ("rx 6650m xt", "radeon rx 6650m xt"),
    ("rx 6650m", "radeon rx 6650m"),
    ("rx 6600m", "radeon rx 6600m"),
    ("rx 6500m", "radeon rx 6500m"),
    ("radeon 780m", "radeon 780m"),
    ("radeon 760m", "radeon 760m"),
    ("radeon 680m", "radeon 680m"),
    ("radeon 660m", "radeon 660m"),
    ("radeon 610m", "radeon 610m"),
    ("intel arc a770m", "intel arc a770m"),
];

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| GPU_ALIASES.iter().copied().collect());

const RX_MODELS: &str =
    "7900m|7800m|7600m\\s*xt|7600m|7600s|6850m\\s*xt|6850m|6800m|6800s|6700m|6700s|6650m\\s*xt|6650m|6600m|6500m";

/// A GPU family. The whole match is handed to [`canonical_gpu`].
pub struct GpuRule {
    pub name: &'static str,
    pattern: Regex,
}

impl GpuRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    pub fn apply(&self, text: &str) -> Option<String> {
        self.pattern
            .find(text)
            .map(|m| canonical_gpu(m.as_str()))
    }
}

pub static GPU_RULES: LazyLock<Vec<GpuRule>> = LazyLock::new(|| {
    vec![
        GpuRule::new(
            "geforce-50",
            r"(?:geforce\s+)?rtx\s*50(?:90|80|70(?:\s*ti)?|60|50)(?:\s+laptop|\s+mobile)?\s+gpu",
        ),
        GpuRule::new(
            "geforce-40",
            r"(?:geforce\s+)?rtx\s*40(?:90|80|70|60|50)(?:\s+laptop|\s+mobile)?\s+gpu",
        ),
        GpuRule::new(
            "geforce-30",
            r"(?:geforce\s+)?rtx\s*30(?:80(?:\s*ti)?|70(?:\s*ti)?|60|50(?:\s*ti)?)(?:\s+laptop|\s+mobile)?\s+gpu",
        ),
        GpuRule::new(
            "rtx-ada",
            r"rtx\s*(?:pro\s*)?(?:5000|4000|3500|3000|2000|1000)\s*ada\s*generation(?:\s+laptop)?\s+gpu",
        ),
        GpuRule::new(
            "rtx-blackwell",
            r"rtx\s*pro\s*(?:3000|2000|1000|500)\s*blackwell\s*generation(?:\s+laptop)?\s+gpu",
        ),
        GpuRule::new(
            "rtx-a-series",
            r"rtx\s*a(?:5500|5000|4500|4000|3000|2000|1000)(?:\s*\d+\s*gb)?(?:\s+laptop)?\s+gpu",
        ),
        GpuRule::new(
            "geforce-max-q",
            r"(?:geforce\s+)?rtx\s*(?:20(?:80|70)|30(?:80|70))\s*(?:super\s*)?with\s*max[-\s]?q\s*design",
        ),
        GpuRule::new("geforce-mobile", r"(?:geforce\s+)?rtx\s*20(?:80|70)\s*\(mobile\)"),
        GpuRule::new("radeon-rx", &format!(r"radeon\s*rx\s*(?:{})", RX_MODELS)),
        GpuRule::new(
            "integrated",
            r"radeon\s*(?:890m|880m|840m|780m|760m|680m|660m|610m)|intel\s*arc\s*a770m",
        ),
        GpuRule::new(
            "legacy-gtx",
            r"geforce\s*gtx\s*(?:3080|2080|2070|2060|1660\s*ti|1650(?:\s*ti)?|1080|1070|1060|980m|970m|965m|960m|950m|880m|870m|860m|850m|780m|775m|770m|765m|760m|680m|670m|660m|580m|560m|460m)(?:\s*with\s*max[-\s]?q\s*design|\s*\(mobile\))?",
        ),
        GpuRule::new(
            "quadro",
            r"quadro\s*(?:rtx|p|t|m)\s*\w+(?:\s*with\s*max[-\s]?q\s*design)?",
        ),
    ]
});

/// Bare model numbers tried only when no family rule matched.
static QUICK_PROBES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\b(50(?:90|80|70(?:\s*ti)?|60|50))\b").unwrap(), "rtx"),
        (Regex::new(r"\b(40(?:90|80|70|60|50))\b").unwrap(), "rtx"),
        (
            Regex::new(r"\b(30(?:80(?:\s*ti)?|70(?:\s*ti)?|60|50(?:\s*ti)?))\b").unwrap(),
            "rtx",
        ),
        (
            Regex::new(r"\b(20(?:80(?:\s*ti)?|70(?:\s*ti)?|60|50(?:\s*ti)?))\b").unwrap(),
            "rtx",
        ),
        (Regex::new(&format!(r"\b({})\b", RX_MODELS)).unwrap(), "radeon rx"),
        (Regex::new(r"\b(780m|760m|680m|660m|610m)\b").unwrap(), "radeon"),
    ]
});

static SERIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rtx\s*(\d{4})(\s*ti\b)?").unwrap());
static ADA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:rtx\s*)?(pro\s*)?(\d{3,4})\s*ada\s*generation").unwrap());
static BLACKWELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rtx\s*pro\s*(\d{3,4})\s*blackwell\s*generation").unwrap());
static A_SERIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rtx\s*a(\d{4})(?:\s*(\d+)\s*gb)?").unwrap());
static MAX_Q: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"max[-\s]?q").unwrap());

/// Maps a raw GPU mention to the key format of the benchmark table.
pub fn canonical_gpu(raw: &str) -> String {
    let t = crate::utils::normalize_text(raw).replace("geforce ", "");
    if let Some(alias) = ALIASES.get(t.as_str()) {
        return alias.to_string();
    }

    // Workstation generations carry a 4-digit number too, resolve them first.
    if t.contains("ada generation") {
        if let Some(c) = ADA.captures(&t) {
            let pro = if c.get(1).is_some() { "pro " } else { "" };
            return format!("rtx {}{} ada generation laptop gpu", pro, &c[2]);
        }
    }
    if t.contains("blackwell generation") {
        if let Some(c) = BLACKWELL.captures(&t) {
            return format!("rtx pro {} blackwell generation laptop gpu", &c[1]);
        }
    }
    if let Some(c) = A_SERIES.captures(&t) {
        let size = c.get(2).map(|m| format!(" {}gb", m.as_str())).unwrap_or_default();
        return format!("rtx a{}{} laptop gpu", &c[1], size);
    }

    if let Some(c) = SERIES.captures(&t) {
        let model = &c[1];
        if MAX_Q.is_match(&t) {
            return format!("geforce rtx {} with max-q design", model);
        }
        if t.contains("(mobile)") {
            return format!("geforce rtx {} (mobile)", model);
        }
        let mut base = format!("rtx {}", model);
        if c.get(2).is_some() {
            base.push_str(" ti");
        }
        return ALIASES
            .get(base.as_str())
            .map(|alias| alias.to_string())
            .unwrap_or_else(|| format!("geforce {} laptop gpu", base));
    }

    if t.starts_with("radeon") {
        return t;
    }
    if t.starts_with("intel arc") {
        return "intel arc a770m".to_string();
    }
    t
}

/// Canonical GPU key for normalized text: family rules first, then the
/// bare model-number probes.
pub fn match_gpu(normalized: &str) -> Option<String> {
    if let Some(found) = GPU_RULES.iter().find_map(|rule| rule.apply(normalized)) {
        return Some(found);
    }
    QUICK_PROBES.iter().find_map(|(probe, prefix)| {
        probe
            .captures(normalized)
            .map(|c| canonical_gpu(&format!("{} {}", prefix, &c[1])))
    })
}
