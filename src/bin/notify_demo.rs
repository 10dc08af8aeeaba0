//! Sends one sample listing through the configured Telegram chat, to check
//! credentials and formatting before leaving the watcher running.

use std::sync::Arc;
use std::time::Duration;

use rental_watcher::notify::{NotificationDispatcher, TelegramConfig, TelegramTransport};
use rental_watcher::{Listing, SeenStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = TelegramConfig {
        bot_token: std::env::var("TELEGRAM_BOT_TOKEN")?,
        chat_id: std::env::var("TELEGRAM_CHAT_ID")?,
    };
    tracing::info!(?cfg, "sending demo notification");

    let transport = TelegramTransport::new(cfg.bot_token).with_timeout(Duration::from_secs(20));
    let dispatcher = NotificationDispatcher::new(Arc::new(transport), cfg.chat_id).with_max_push(1);

    let sample = Listing {
        source: "Demo".into(),
        title: "Kaksio keskustassa, 48 m²".into(),
        price_monthly: Some(720),
        address: "Hovioikeudenpuistikko 9".into(),
        city: "Vaasa".into(),
        url: "https://example.com/listing/1".into(),
    };

    // Throwaway store: the demo must not touch the real seen file.
    let mut seen = SeenStore::new();
    let out = dispatcher.dispatch(&[sample], &mut seen).await;
    anyhow::ensure!(out.sent == 1, "demo notification was not delivered, see log");

    println!("notify-demo done");
    Ok(())
}
