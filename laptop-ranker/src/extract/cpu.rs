use regex::{Captures, Regex};
use std::sync::LazyLock;

/// One CPU naming family: a pattern and the function that rebuilds the
/// canonical benchmark key from its captures.
pub struct CpuRule {
    pub name: &'static str,
    pattern: Regex,
    canon: fn(&Captures) -> Option<String>,
}

impl CpuRule {
    fn new(name: &'static str, pattern: &str, canon: fn(&Captures) -> Option<String>) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            canon,
        }
    }

    /// Runs the rule against already-normalized text.
    pub fn apply(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        (self.canon)(&caps)
    }
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map(|m| m.as_str()).unwrap_or("")
}

/// Ordered from the most to the least specific family. First hit wins.
pub static CPU_RULES: LazyLock<Vec<CpuRule>> = LazyLock::new(|| {
    vec![
        // "Apple M4 Pro 12 Core", "Apple M3 8-core"
        CpuRule::new(
            "apple-silicon",
            r"apple\s*m(\d)\b(?:\s*(max|pro|ultra)\b)?(?:\s*(\d{1,2})\s*-?\s*c(?:ore|œurs?|oeurs?)s?)?",
            |c| {
                let mut key = format!("apple m{}", group(c, 1));
                if !group(c, 2).is_empty() {
                    key.push(' ');
                    key.push_str(group(c, 2));
                }
                if !group(c, 3).is_empty() {
                    key.push_str(&format!(" {} core", group(c, 3)));
                }
                Some(key)
            },
        ),
        // "Snapdragon X Elite - X1E-84-100", "Snapdragon X Plus"
        CpuRule::new(
            "snapdragon-x",
            r"(?:qualcomm\s*)?snapdragon\s*x\s*(elite|plus)\b(?:\s*-\s*([\w-]+))?",
            |c| {
                let code = match group(c, 2) {
                    "" => String::new(),
                    code => format!(" - {}", code),
                };
                Some(format!("qualcomm snapdragon x {}{}", group(c, 1), code))
            },
        ),
        // "Core Ultra 7 155H", "Ultra-9 285HX", "Ultra 7 256V"
        CpuRule::new(
            "intel-core-ultra",
            r"(?:intel\s*)?(?:core\s*)?ultra[-\s]?([579])[-\s]?(\d{3})(hx|h|u|v)\b",
            |c| {
                Some(format!(
                    "intel core ultra {} {}{}",
                    group(c, 1),
                    group(c, 2),
                    group(c, 3)
                ))
            },
        ),
        // "Intel Core 5 210H", "Core 7 150U"
        CpuRule::new(
            "intel-core-n",
            r"(?:intel\s*)?core\s*([3579])\s*(\d{3})(h|u)\b",
            |c| {
                Some(format!(
                    "intel core {} {}{}",
                    group(c, 1),
                    group(c, 2),
                    group(c, 3)
                ))
            },
        ),
        // "i7-13700HX", "i5 12500H"
        CpuRule::new(
            "intel-core-h",
            r"\b(i[3579])[-\s]?(\d{4,5})(hx|h)\b",
            |c| Some(format!("{}-{}{}", group(c, 1), group(c, 2), group(c, 3))),
        ),
        // "i5-8250U", "i7-1065G7"
        CpuRule::new(
            "intel-core-low-power",
            r"\b(i[3579])[-\s]?(\d{4,5})(u|g\d?|m)\b",
            |c| Some(format!("{}-{}{}", group(c, 1), group(c, 2), group(c, 3))),
        ),
        CpuRule::new("intel-celeron", r"celeron\s*([njg]?\d{4,5})\b", |c| {
            Some(format!("intel celeron {}", group(c, 1)))
        }),
        CpuRule::new("intel-celeron-bare", r"\bceleron\b", |_| {
            Some("intel celeron".to_string())
        }),
        CpuRule::new(
            "intel-pentium",
            r"pentium\s*(?:gold|silver|n)?\s*(\d{4,5})\b",
            |c| Some(format!("intel pentium {}", group(c, 1))),
        ),
        CpuRule::new("intel-pentium-bare", r"\bpentium\b", |_| {
            Some("intel pentium".to_string())
        }),
        // "Ryzen AI 9 HX 370", "Ryzen 7 AI 350", "Ryzen AI 7 Pro 360"
        CpuRule::new(
            "amd-ryzen-ai",
            r"ryzen\s*(?:ai\s*([3579])|([3579])\s*ai)\s*(?:(max\+?\s*pro|max\+?|pro)\s*)?(?:(hx|h|u)\s*)?(\d{3})\b",
            |c| {
                let tier = match group(c, 1) {
                    "" => group(c, 2),
                    tier => tier,
                };
                let flavor = group(c, 3).split_whitespace().collect::<Vec<_>>().join(" ");
                let mut pieces = vec!["amd ryzen ai".to_string()];
                if !flavor.is_empty() {
                    pieces.push(flavor);
                }
                pieces.push(tier.to_string());
                if !group(c, 4).is_empty() {
                    pieces.push(group(c, 4).to_string());
                }
                pieces.push(group(c, 5).to_string());
                Some(pieces.join(" "))
            },
        ),
        // "Ryzen 7 7840HS", "Ryzen 5 7520U"
        CpuRule::new(
            "amd-ryzen",
            r"ryzen\s*([3579])\s*(\d{4})(hs|hx|h|u|c)?\b",
            |c| {
                Some(format!(
                    "amd ryzen {} {}{}",
                    group(c, 1),
                    group(c, 2),
                    group(c, 3)
                ))
            },
        ),
        // "Ryzen 7 260"
        CpuRule::new(
            "amd-ryzen-3digit",
            r"ryzen\s*([3579])\s*(\d{3})(hs|hx|h|u)?\b",
            |c| {
                Some(format!(
                    "amd ryzen {} {}{}",
                    group(c, 1),
                    group(c, 2),
                    group(c, 3)
                ))
            },
        ),
    ]
});

/// Canonical CPU key for normalized text, if any family matches.
pub fn match_cpu(normalized: &str) -> Option<String> {
    CPU_RULES.iter().find_map(|rule| rule.apply(normalized))
}
