// src/notify/format.rs
//! Message bodies for the Telegram HTML parse mode.

use html_escape::encode_text;

use crate::listing::{normalize_text, Listing};
use crate::relevance::is_central;

pub const PRICE_PLACEHOLDER: &str = "—";

/// One listing as a notification. Deterministic for a given listing.
pub fn format_listing(l: &Listing) -> String {
    let price = match l.price_monthly {
        Some(p) => format!("{p} €/kk"),
        None => PRICE_PLACEHOLDER.to_string(),
    };
    let center_flag = if is_central(&l.title, &l.address) {
        " (keskusta?)"
    } else {
        ""
    };
    let title = normalize_text(&l.title);
    let location = normalize_text(l.location());

    format!(
        "🔔 <b>Uusi vuokra-asunto</b>{center_flag}\n\
         🏷️ {}\n\
         📍 {}\n\
         💶 {price}\n\
         🔗 {}\n\
         🏠 Lähde: {}",
        encode_text(&title),
        encode_text(&location),
        encode_text(&l.url),
        encode_text(&l.source),
    )
}

/// Summary sent once when a run has more new listings than it may push.
pub fn format_overflow(count: usize) -> String {
    format!("ℹ️ {count} lisäosumaa jäi lähettämättä tässä ajossa. Ne merkitty nähdyiksi.")
}
