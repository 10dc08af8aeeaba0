// src/ingest/providers/html.rs
//! Shared card-scraping harness for the HTML listing sites.
//!
//! Each site supplies a [`CardRules`] table; everything else (link
//! resolution, text cleanup, price parsing, ceiling check) lives here so a
//! broken selector on one site never touches the others.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::SourceFetchError;
use crate::listing::{normalize_text, parse_price, Listing, DEFAULT_TITLE};

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; RentalWatcher/1.1; +https://example.com)";

/// Where a card keeps its rent.
#[derive(Debug, Clone, Copy)]
pub enum PriceRule {
    /// Text of the first element matching the selector.
    Selector(&'static str),
    /// First text node mentioning a currency (`€` or `eur`).
    CurrencyText,
}

/// Per-site extraction rules. Selector lists use CSS `,` alternation.
#[derive(Debug, Clone, Copy)]
pub struct CardRules {
    pub source: &'static str,
    pub base: &'static str,
    pub cards: &'static str,
    pub link: &'static str,
    pub title: &'static str,
    pub price: PriceRule,
    pub address: &'static str,
}

/// Shared HTTP client for all adapters: fixed timeout, browser-ish UA.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

pub fn selector(css: &str) -> Result<Selector, SourceFetchError> {
    Selector::parse(css).map_err(|e| SourceFetchError::selector(css, e))
}

/// One GET; non-2xx is an error.
pub async fn fetch_html(client: &Client, url: Url) -> Result<String, SourceFetchError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// Extract listings from a search result page.
pub fn parse_cards(
    rules: &CardRules,
    html: &str,
    city: &str,
    max_rent: u32,
) -> Result<Vec<Listing>, SourceFetchError> {
    let base = Url::parse(rules.base)?;
    let cards = selector(rules.cards)?;
    let link = selector(rules.link)?;
    let title = selector(rules.title)?;
    let address = selector(rules.address)?;
    let price = match rules.price {
        PriceRule::Selector(css) => Some(selector(css)?),
        PriceRule::CurrencyText => None,
    };

    let doc = Html::parse_document(html);
    let mut seen_urls = HashSet::new();
    let mut out = Vec::new();

    for card in doc.select(&cards) {
        let Some(url) = card_href(card, &link).and_then(|href| resolve_link(&base, href)) else {
            continue;
        };
        // Card selectors also match the anchor nested inside a card; the
        // outermost match for a URL comes first and is the one that decides.
        if !seen_urls.insert(url.clone()) {
            continue;
        }

        let price_monthly = match &price {
            Some(sel) => first_text(card, sel).as_deref().and_then(parse_price),
            None => currency_text(card).and_then(parse_price),
        };

        let listing = Listing {
            source: rules.source.to_string(),
            title: first_text(card, &title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            price_monthly,
            address: first_text(card, &address).unwrap_or_default(),
            city: city.to_string(),
            url,
        };

        if listing.within_budget(max_rent) {
            out.push(listing);
        }
    }
    Ok(out)
}

/// The card's own `href` when it is an anchor, otherwise the first matching link inside.
fn card_href<'a>(card: ElementRef<'a>, link: &Selector) -> Option<&'a str> {
    let own = card.value();
    if own.name() == "a" {
        if let Some(href) = own.attr("href") {
            return Some(href);
        }
    }
    card.select(link).next().and_then(|a| a.value().attr("href"))
}

/// Absolute http(s) URL for `href`, or None for empty / non-web links.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

fn first_text(card: ElementRef<'_>, sel: &Selector) -> Option<String> {
    card.select(sel)
        .map(|el| normalize_text(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|t| !t.is_empty())
}

fn currency_text(card: ElementRef<'_>) -> Option<&str> {
    card.text()
        .find(|t| t.contains('€') || t.to_lowercase().contains("eur"))
}
