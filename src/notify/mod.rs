// src/notify/mod.rs
pub mod dispatch;
pub mod format;
pub mod telegram;

use async_trait::async_trait;

use crate::error::DeliveryError;

pub use dispatch::{DispatchOutcome, NotificationDispatcher};
pub use telegram::{TelegramConfig, TelegramTransport};

/// Outbound messaging channel. One call per message, no read path.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `text` (HTML subset: `<b>`, line breaks) to `target`.
    async fn send(&self, target: &str, text: &str, disable_preview: bool) -> Result<(), DeliveryError>;

    fn name(&self) -> &'static str;
}
