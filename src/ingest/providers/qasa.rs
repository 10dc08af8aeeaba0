// src/ingest/providers/qasa.rs
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::SourceFetchError;
use crate::ingest::providers::html::{fetch_html, parse_cards, CardRules, PriceRule};
use crate::ingest::types::SourceAdapter;
use crate::listing::Listing;

// Qasa renders the rent as bare text inside the card, so it is found by currency.
pub const RULES: CardRules = CardRules {
    source: "Qasa",
    base: "https://www.qasa.fi",
    cards: "a[href*='/fi/asunto/'], article, [data-testid*='listing']",
    link: "a[href*='/fi/asunto/']",
    title: "h2, [data-testid*='title'], .title",
    price: PriceRule::CurrencyText,
    address: "[data-testid*='address'], .address, .location",
};

pub struct QasaProvider {
    client: Client,
}

impl QasaProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// `/fi/asunnot?city={city}&maxRent={max}&type=apartment`
    pub fn search_url(city: &str, max_rent: u32) -> Result<Url, SourceFetchError> {
        let mut url = Url::parse(RULES.base)?.join("/fi/asunnot")?;
        url.query_pairs_mut()
            .append_pair("city", city)
            .append_pair("maxRent", &max_rent.to_string())
            .append_pair("type", "apartment");
        Ok(url)
    }

    pub fn parse_page(html: &str, city: &str, max_rent: u32) -> Result<Vec<Listing>, SourceFetchError> {
        parse_cards(&RULES, html, city, max_rent)
    }
}

#[async_trait]
impl SourceAdapter for QasaProvider {
    async fn fetch(&self, city: &str, max_rent: u32) -> Result<Vec<Listing>, SourceFetchError> {
        let body = fetch_html(&self.client, Self::search_url(city, max_rent)?).await?;
        Self::parse_page(&body, city, max_rent)
    }

    fn name(&self) -> &'static str {
        RULES.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_shape() {
        let url = QasaProvider::search_url("Vaasa", 850).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.qasa.fi/fi/asunnot?city=Vaasa&maxRent=850&type=apartment"
        );
    }

    #[test]
    fn price_comes_from_currency_text() {
        let page = r#"
          <a href="/fi/asunto/abc123">
            <h2>Valoisa kaksio</h2>
            <p>2 huonetta · 52 m²</p>
            <p>790 €/kk</p>
            <span class="location">Vaasa centrum</span>
          </a>
          <a href="/fi/asunto/def456">
            <h2>Iso kolmio</h2>
            <p>1 050 EUR / kk</p>
          </a>
        "#;
        let out = QasaProvider::parse_page(page, "Vaasa", 850).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Valoisa kaksio");
        assert_eq!(out[0].price_monthly, Some(790));
        assert_eq!(out[0].address, "Vaasa centrum");
        assert_eq!(out[0].url, "https://www.qasa.fi/fi/asunto/abc123");
    }

    #[test]
    fn rent_beside_the_link_is_read_from_the_card() {
        let page = r#"
          <article>
            <a href="/fi/asunto/zz9"><h2>Kolmio</h2></a>
            <p>3h+k · 1 050 €/kk</p>
          </article>
          <article>
            <a href="/fi/asunto/yy8"><h2>Yksiö</h2></a>
            <p>1h+kt · 480 €/kk</p>
          </article>
        "#;
        let out = QasaProvider::parse_page(page, "Vaasa", 850).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://www.qasa.fi/fi/asunto/yy8");
        assert_eq!(out[0].price_monthly, Some(480));
    }
}
