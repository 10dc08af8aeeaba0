// src/ingest/types.rs
use async_trait::async_trait;

use crate::error::SourceFetchError;
use crate::listing::Listing;

/// One listing site. Implementations are stateless between calls and apply
/// the rent ceiling themselves, passing through listings with no price.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, city: &str, max_rent: u32) -> Result<Vec<Listing>, SourceFetchError>;
    fn name(&self) -> &'static str;
}
