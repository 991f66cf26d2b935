use crate::types::{RankerError, Result};
use crate::utils::collapse_whitespace;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Euro amounts with space / NBSP / narrow NBSP / dot thousands separators,
/// an optional comma or dot decimal part, and the retailer "1 199€99" form.
static PRICE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:[\s.]\d{3})+|\d+)(?:[.,](\d{1,2}))?\s*€(?:(\d{2})\b)?").unwrap()
});

/// Parses the current price out of free text. Several amounts may appear
/// (struck-through "was" prices come first), the last one wins.
pub fn parse_price_eur(text: &str) -> Option<f64> {
    PRICE_TOKEN
        .captures_iter(text)
        .filter_map(|c| {
            let whole: String = c[1].chars().filter(char::is_ascii_digit).collect();
            let mut value: f64 = whole.parse().ok()?;
            let cents = c.get(2).or_else(|| c.get(3)).map(|m| m.as_str());
            if let Some(cents) = cents {
                let fraction: f64 = cents.parse().ok()?;
                value += fraction / 10f64.powi(cents.len() as i32);
            }
            Some(value)
        })
        .filter(|value| *value > 0.0)
        .last()
}

/// Deduplication key: scheme, host and path, without query, fragment or
/// trailing slash.
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string().trim_end_matches('/').to_string()
        }
        Err(_) => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim_end_matches('/')
            .to_string(),
    }
}

/// Resolves a scraped href against the retailer origin. Protocol-relative and
/// root-relative links become absolute; a doubled host prefix is collapsed.
pub fn clean_href(href: &str, origin: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        Url::parse(origin).ok()?.join(href).ok()?.to_string()
    };

    Some(collapse_duplicate_host(&absolute))
}

fn collapse_duplicate_host(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(host) = parsed.host_str() else {
        return url.to_string();
    };
    let doubled = format!("{}//{}/", host, host);
    let embedded = format!("{}/https://{}/", host, host);
    if url.contains(&doubled) {
        url.replacen(&doubled, &format!("{}/", host), 1)
    } else if url.contains(&embedded) {
        url.replacen(&embedded, &format!("{}/", host), 1)
    } else {
        url.to_string()
    }
}

/// CSS selectors locating the parts of a product card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSelectorSpec {
    pub card: &'static str,
    pub title: &'static str,
    pub link: &'static str,
    pub price: &'static str,
    pub sponsor: Option<&'static str>,
    /// Elements scanned for a euro amount when the price selector finds nothing.
    pub price_scan: &'static str,
}

/// A product card as read from the page, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCard {
    pub title: Option<String>,
    pub href: Option<String>,
    pub price_text: Option<String>,
}

impl RawCard {
    pub fn new(title: &str, href: &str, price_text: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            href: Some(href.to_string()),
            price_text: Some(price_text.to_string()),
        }
    }
}

struct CompiledSelectors {
    card: Selector,
    title: Selector,
    link: Selector,
    price: Selector,
    sponsor: Option<Selector>,
    price_scan: Selector,
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| RankerError::Selector(format!("{}: {:?}", selector, e)))
}

impl CardSelectorSpec {
    fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            card: compile(self.card)?,
            title: compile(self.title)?,
            link: compile(self.link)?,
            price: compile(self.price)?,
            sponsor: self.sponsor.map(compile).transpose()?,
            price_scan: compile(self.price_scan)?,
        })
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Walks the card containers of a rendered document and reads title, link
/// and price text from each. Sponsored slots are skipped.
pub fn parse_cards(html: &str, spec: &CardSelectorSpec) -> Result<Vec<RawCard>> {
    let selectors = spec.compile()?;
    let document = Html::parse_document(html);

    let mut cards = Vec::new();
    let mut sponsored = 0usize;
    for card in document.select(&selectors.card) {
        if is_sponsored(card, &selectors) {
            sponsored += 1;
            continue;
        }
        cards.push(read_card(card, &selectors));
    }

    debug!(
        "Matched {} cards with '{}' ({} sponsored skipped)",
        cards.len(),
        spec.card,
        sponsored
    );
    Ok(cards)
}

fn is_sponsored(card: ElementRef<'_>, selectors: &CompiledSelectors) -> bool {
    let flagged_class = card
        .value()
        .attr("class")
        .map(|c| c.to_lowercase().contains("sponsor"))
        .unwrap_or(false);
    flagged_class
        || selectors
            .sponsor
            .as_ref()
            .map(|s| card.select(s).next().is_some())
            .unwrap_or(false)
}

fn read_card(card: ElementRef<'_>, selectors: &CompiledSelectors) -> RawCard {
    let link = card.select(&selectors.link).next();
    let href = match card.value().name() {
        "a" => card.value().attr("href"),
        _ => link.and_then(|a| a.value().attr("href")),
    };
    let href = href.map(str::to_string);

    let title = card
        .select(&selectors.title)
        .map(element_text)
        .find(|t| !t.is_empty())
        .or_else(|| link.and_then(|a| a.value().attr("title")).map(collapse_whitespace))
        .or_else(|| link.map(element_text))
        .and_then(non_empty);

    let mut price_parts: Vec<String> = card
        .select(&selectors.price)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    if price_parts.is_empty() {
        price_parts = card
            .select(&selectors.price_scan)
            .map(element_text)
            .filter(|t| t.contains('€'))
            .collect();
    }
    let price_text = non_empty(price_parts.join(" "));

    RawCard {
        title,
        href,
        price_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_tokens() {
        assert_eq!(parse_price_eur("1 199,00 €"), Some(1199.0));
        assert_eq!(parse_price_eur("699,99 €"), Some(699.99));
        assert_eq!(parse_price_eur("1\u{202F}299,99\u{00A0}€"), Some(1299.99));
        assert_eq!(parse_price_eur("1.199,00 €"), Some(1199.0));
        assert_eq!(parse_price_eur("1 199€99"), Some(1199.99));
        assert_eq!(parse_price_eur("sans prix"), None);
        assert_eq!(parse_price_eur("0,00 €"), None);
    }

    #[test]
    fn last_price_token_wins() {
        assert_eq!(parse_price_eur("1 499,99 € 1 299,99 €"), Some(1299.99));
    }

    #[test]
    fn canonical_url_drops_query_and_fragment() {
        assert_eq!(
            canonical_url("https://www.fnac.com/a123/pc?oref=abc&cm_mmc=x#reviews"),
            "https://www.fnac.com/a123/pc"
        );
        assert_eq!(canonical_url("https://www.darty.com/p/123/"), "https://www.darty.com/p/123");
    }

    #[test]
    fn href_resolution() {
        let origin = "https://www.fnac.com";
        assert_eq!(
            clean_href("//www.fnac.com/a1/pc", origin).as_deref(),
            Some("https://www.fnac.com/a1/pc")
        );
        assert_eq!(
            clean_href("/a1/pc", origin).as_deref(),
            Some("https://www.fnac.com/a1/pc")
        );
        assert_eq!(
            clean_href("https://www.fnac.com//www.fnac.com/a1/pc", origin).as_deref(),
            Some("https://www.fnac.com/a1/pc")
        );
        assert_eq!(clean_href("javascript:void(0)", origin), None);
    }
}
