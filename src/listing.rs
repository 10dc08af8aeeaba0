// src/listing.rs
//! Normalized listing entity shared by every source adapter, plus the text
//! helpers adapters use to build one.

use std::fmt;

use once_cell::sync::OnceCell;
use regex::Regex;

/// Title used when a card carries no recognizable headline.
pub const DEFAULT_TITLE: &str = "Ilmoitus";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub source: String,              // adapter name, e.g. "Vuokraovi"
    pub title: String,               // free-text headline
    pub price_monthly: Option<u32>,  // None when the page had no parseable price
    pub address: String,             // may be empty
    pub city: String,                // the query city
    pub url: String,                 // absolute link, part of the identity
}

impl Listing {
    pub fn key(&self) -> ListingKey {
        ListingKey::new(&self.source, &self.url)
    }

    /// Price ceiling check used at the adapter boundary.
    /// Unknown price is never treated as over budget.
    pub fn within_budget(&self, max_rent: u32) -> bool {
        self.price_monthly.map_or(true, |p| p <= max_rent)
    }

    /// Address, or the query city when the card had none.
    pub fn location(&self) -> &str {
        if self.address.trim().is_empty() {
            &self.city
        } else {
            &self.address
        }
    }
}

/// Deduplication identity: `source|url`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingKey(String);

impl ListingKey {
    pub fn new(source: &str, url: &str) -> Self {
        Self(format!("{source}|{url}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize scraped text: decode entities, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// Parse a monthly rent out of free text such as `"1 200 €/kk"` or `"750,00 €"`.
///
/// When the text names a currency (`€` or `eur`), the number right before
/// the first marker is the rent, so `"3h+k · 1 050 €/kk"` gives 1050. A range
/// such as `"700–800 €"` gives its lower end. Without a marker the first
/// number wins. Spaces (including NBSP and narrow NBSP) and dots are accepted
/// as thousands separators; a trailing decimal part of one or two digits is
/// dropped.
pub fn parse_price(text: &str) -> Option<u32> {
    static RE_NUM: OnceCell<Regex> = OnceCell::new();
    static RE_CURRENCY: OnceCell<Regex> = OnceCell::new();
    let re_num = RE_NUM
        .get_or_init(|| Regex::new(r"\d[\d \u{a0}\u{202f}.]*(?:,\d+)?").unwrap());
    let re_currency = RE_CURRENCY.get_or_init(|| Regex::new(r"(?i)€|eur").unwrap());

    let before_marker = re_currency.find(text).and_then(|marker| {
        let head = &text[..marker.start()];
        let nums: Vec<_> = re_num.find_iter(head).collect();
        let (last, earlier) = nums.split_last()?;
        match earlier.last() {
            Some(prev) if matches!(head[prev.end()..last.start()].trim(), "-" | "–") => Some(*prev),
            _ => Some(*last),
        }
    });
    let found = before_marker.or_else(|| re_num.find(text))?;

    let raw = found.as_str().trim_end_matches([' ', '.', '\u{a0}', '\u{202f}']);

    let integral = match raw.rfind([',', '.']) {
        Some(idx) if (1..=2).contains(&(raw.len() - idx - 1)) => &raw[..idx],
        _ => raw,
    };

    let digits: String = integral.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: Option<u32>) -> Listing {
        Listing {
            source: "A".into(),
            title: "Kaksio".into(),
            price_monthly: price,
            address: String::new(),
            city: "Vaasa".into(),
            url: "https://example.test/1".into(),
        }
    }

    #[test]
    fn key_joins_source_and_url() {
        assert_eq!(listing(None).key().as_str(), "A|https://example.test/1");
    }

    #[test]
    fn unknown_price_is_within_budget() {
        assert!(listing(None).within_budget(0));
        assert!(listing(Some(850)).within_budget(850));
        assert!(!listing(Some(851)).within_budget(850));
    }

    #[test]
    fn location_falls_back_to_city() {
        let mut l = listing(None);
        assert_eq!(l.location(), "Vaasa");
        l.address = "Hovioikeudenpuistikko 1".into();
        assert_eq!(l.location(), "Hovioikeudenpuistikko 1");
    }

    #[test]
    fn normalize_text_collapses_ws_and_decodes() {
        assert_eq!(normalize_text("  Kaksio&nbsp;\n  keskustassa &amp; lähellä "), "Kaksio keskustassa & lähellä");
    }

    #[test]
    fn parse_price_handles_common_formats() {
        assert_eq!(parse_price("700 €/kk"), Some(700));
        assert_eq!(parse_price("1 200 €"), Some(1200));
        assert_eq!(parse_price("1\u{a0}050 € / kk"), Some(1050));
        assert_eq!(parse_price("750,00 €"), Some(750));
        assert_eq!(parse_price("1.200 €"), Some(1200));
        assert_eq!(parse_price("Vuokra: ca. 640 eur"), Some(640));
        assert_eq!(parse_price("700–800 €"), Some(700));
        assert_eq!(parse_price("700 - 800 €/kk"), Some(700));
        assert_eq!(parse_price("3h+k · 1 050 €/kk"), Some(1050));
        assert_eq!(parse_price("2 huonetta · 52 m² · 790 EUR / kk"), Some(790));
        assert_eq!(parse_price("€ 640 / kk"), Some(640));
    }

    #[test]
    fn parse_price_rejects_missing_or_huge_numbers() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Kysy hintaa"), None);
        assert_eq!(parse_price("99999999999 €"), None);
    }
}
