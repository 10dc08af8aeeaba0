// src/ingest/providers/mod.rs
pub mod html;
pub mod oikotie;
pub mod qasa;
pub mod vuokraovi;

use reqwest::Client;

use crate::ingest::types::SourceAdapter;

/// Names accepted by `--sources`, in default fetch order.
pub const KNOWN_SOURCES: &[&str] = &["vuokraovi", "oikotie", "qasa"];

/// Build one adapter by its lowercase name.
pub fn by_name(name: &str, client: Client) -> Option<Box<dyn SourceAdapter>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "vuokraovi" => Some(Box::new(vuokraovi::VuokraoviProvider::new(client))),
        "oikotie" => Some(Box::new(oikotie::OikotieProvider::new(client))),
        "qasa" => Some(Box::new(qasa::QasaProvider::new(client))),
        _ => None,
    }
}
