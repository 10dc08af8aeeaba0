// src/ingest/providers/oikotie.rs
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::SourceFetchError;
use crate::ingest::providers::html::{fetch_html, parse_cards, CardRules, PriceRule};
use crate::ingest::types::SourceAdapter;
use crate::listing::Listing;

pub const RULES: CardRules = CardRules {
    source: "Oikotie",
    base: "https://asunnot.oikotie.fi",
    cards: "[data-testid*='card'], article, a[href*='/vuokrattavat-asunnot/']",
    link: "a[href*='/vuokrattavat-asunnot/']",
    title: "[data-testid*='title'], h2, .styles__Title, .title",
    price: PriceRule::Selector("[data-testid*='price'], .price, .styles__Price"),
    address: "[data-testid*='address'], .address, .styles__Address",
};

pub struct OikotieProvider {
    client: Client,
}

impl OikotieProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// `/vuokrattavat-asunnot?locations={city}&price[max]={max}&cardType=100`
    pub fn search_url(city: &str, max_rent: u32) -> Result<Url, SourceFetchError> {
        let mut url = Url::parse(RULES.base)?.join("/vuokrattavat-asunnot")?;
        url.query_pairs_mut()
            .append_pair("locations", city)
            .append_pair("price[max]", &max_rent.to_string())
            .append_pair("cardType", "100");
        Ok(url)
    }

    pub fn parse_page(html: &str, city: &str, max_rent: u32) -> Result<Vec<Listing>, SourceFetchError> {
        parse_cards(&RULES, html, city, max_rent)
    }
}

#[async_trait]
impl SourceAdapter for OikotieProvider {
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
    fn search_url_has_location_and_price_filter() {
        let url = OikotieProvider::search_url("Vaasa", 850).unwrap();
        assert_eq!(url.path(), "/vuokrattavat-asunnot");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("locations".to_string(), "Vaasa".to_string()),
                ("price[max]".to_string(), "850".to_string()),
                ("cardType".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn anchor_cards_use_their_own_href() {
        let page = r#"
          <a href="/vuokrattavat-asunnot/vaasa/22334455">
            <div class="title">Yksiö keskustassa</div>
            <div class="price">545 € / kk</div>
            <div class="address">Kauppapuistikko 20, Vaasa</div>
          </a>
          <a href="https://asunnot.oikotie.fi/vuokrattavat-asunnot/vaasa/22334456">
            <div class="title">Kaksio</div>
          </a>
        "#;
        let out = OikotieProvider::parse_page(page, "Vaasa", 850).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://asunnot.oikotie.fi/vuokrattavat-asunnot/vaasa/22334455");
        assert_eq!(out[0].title, "Yksiö keskustassa");
        assert_eq!(out[0].price_monthly, Some(545));
        assert_eq!(out[0].address, "Kauppapuistikko 20, Vaasa");
        assert_eq!(out[1].price_monthly, None);
    }

    #[test]
    fn nested_matches_do_not_duplicate() {
        let page = r#"
          <div data-testid="listing-card">
            <a href="/vuokrattavat-asunnot/vaasa/1"><h2>Kolmio</h2></a>
          </div>
        "#;
        let out = OikotieProvider::parse_page(page, "Vaasa", 850).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn price_outside_the_anchor_still_applies_the_ceiling() {
        let page = r#"
          <div data-testid="card">
            <a href="/vuokrattavat-asunnot/vaasa/999"><h2>Kolmio</h2></a>
            <span class="price">1 190 €/kk</span>
          </div>
        "#;
        let out = OikotieProvider::parse_page(page, "Vaasa", 850).unwrap();
        assert!(out.is_empty(), "got {out:?}");
    }
}
