// src/relevance.rs
//! "Is this in the city center?" heuristic and the run-level fallback policy.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::listing::Listing;

/// Case-insensitive match of title + address against the central synonyms.
pub fn is_central(title: &str, address: &str) -> bool {
    // Finnish inflections of "keskus(ta)", Swedish "centrum", English center/centre.
    static RE_CENTER: OnceCell<Regex> = OnceCell::new();
    let re_center = RE_CENTER.get_or_init(|| {
        Regex::new(r"(?i)\b(?:keskus(?:ta|tan|tassa|ssa)?|centrum|cent(?:er|re))\b").unwrap()
    });
    re_center.is_match(&format!("{title} {address}"))
}

/// Listings that survived the relevance step, and whether the fallback fired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub listings: Vec<Listing>,
    pub fell_back: bool,
}

/// Keep only central listings, unless none match: then keep the whole batch.
///
/// Order is preserved in both branches.
pub fn select_central(all: Vec<Listing>) -> Selection {
    let central: Vec<Listing> = all
        .iter()
        .filter(|l| is_central(&l.title, &l.address))
        .cloned()
        .collect();

    if central.is_empty() {
        Selection {
            fell_back: !all.is_empty(),
            listings: all,
        }
    } else {
        Selection {
            listings: central,
            fell_back: false,
        }
    }
}
