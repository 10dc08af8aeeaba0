// src/ingest/providers/vuokraovi.rs
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::SourceFetchError;
use crate::ingest::providers::html::{fetch_html, parse_cards, CardRules, PriceRule};
use crate::ingest::types::SourceAdapter;
use crate::listing::Listing;

pub const RULES: CardRules = CardRules {
    source: "Vuokraovi",
    base: "https://www.vuokraovi.com",
    cards: "[data-automation-id='search-result-card'], .card-item, article",
    link: "a[href*='/vuokra-asunto/']",
    title: "[data-automation-id='card-title'], h2, .heading, .card__title",
    price: PriceRule::Selector("[data-automation-id='card-price'], .price, .card__price"),
    address: "[data-automation-id='card-address'], .address, .card__address, .location",
};

pub struct VuokraoviProvider {
    client: Client,
}

impl VuokraoviProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// `/vuokra-asunnot/{city}?yhteensa=1&jarjestys=0&vuokraMax={max}`
    pub fn search_url(city: &str, max_rent: u32) -> Result<Url, SourceFetchError> {
        let mut url = Url::parse(RULES.base)?;
        url.set_path(&format!("/vuokra-asunnot/{city}"));
        url.query_pairs_mut()
            .append_pair("yhteensa", "1")
            .append_pair("jarjestys", "0")
            .append_pair("vuokraMax", &max_rent.to_string());
        Ok(url)
    }

    pub fn parse_page(html: &str, city: &str, max_rent: u32) -> Result<Vec<Listing>, SourceFetchError> {
        parse_cards(&RULES, html, city, max_rent)
    }
}

#[async_trait]
impl SourceAdapter for VuokraoviProvider {
    async fn fetch(&self, city: &str, max_rent: u32) -> Result<Vec<Listing>, SourceFetchError> {
        let body = fetch_html(&self.client, Self::search_url(city, max_rent)?).await?;
        Self::parse_page(&body, city, max_rent)
    }

    fn name(&self) -> &'static str {
        RULES.source
    }
}
