/// Collapse every whitespace run (NBSP and narrow NBSP included) to one space,
/// trim, and lowercase. All extraction rules run on this form.
pub fn normalize_text(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Same as [`normalize_text`] without the case folding.
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{00A0}' || c == '\u{202F}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// File-system safe key used by the result cache.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut last_dash = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            slug.push(c);
            last_dash = c == '-';
        }
    }
    slug.chars().take(140).collect()
}

/// Word-level keyword matching helpers.
pub mod keywords {
    /// A set of keywords or short phrases matched on whole words, so that
    /// "stand" does not fire on "standard".
    #[derive(Debug, Clone)]
    pub struct KeywordSet {
        phrases: Vec<String>,
    }

    impl KeywordSet {
        pub fn new<I, S>(words: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: AsRef<str>,
        {
            let phrases = words
                .into_iter()
                .map(|w| tokenize(w.as_ref()))
                .filter(|p| !p.trim().is_empty())
                .collect();
            Self { phrases }
        }

        pub fn is_empty(&self) -> bool {
            self.phrases.is_empty()
        }

        pub fn first_match(&self, text: &str) -> Option<&str> {
            let haystack = tokenize(text);
            self.phrases
                .iter()
                .find(|phrase| haystack.contains(phrase.as_str()))
                .map(|phrase| phrase.trim())
        }

        pub fn matches(&self, text: &str) -> bool {
            self.first_match(text).is_some()
        }
    }

    /// Lowercased tokens padded with spaces: " pc portable asus ".
    fn tokenize(text: &str) -> String {
        let tokens: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '+')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        format!(" {} ", tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::keywords::KeywordSet;
    use super::*;

    #[test]
    fn normalize_handles_narrow_spaces() {
        assert_eq!(normalize_text("  RTX\u{202F}4070 \u{00A0}Laptop  "), "rtx 4070 laptop");
    }

    #[test]
    fn slugify_keeps_safe_characters() {
        assert_eq!(slugify("PC Portable  Gamer RTX"), "pc-portable-gamer-rtx");
        assert_eq!(slugify("Cdiscount"), "cdiscount");
        assert_eq!(slugify("écran/16\""), "cran16");
    }

    #[test]
    fn keywords_match_whole_words() {
        let set = KeywordSet::new(["stand", "pc portable", "lave-linge"]);
        assert!(!set.matches("Standard edition"));
        assert!(set.matches("Laptop stand aluminium"));
        assert!(set.matches("PC Portable ASUS"));
        assert!(set.matches("Lave linge 8kg"));
    }
}
