// src/config.rs
//! Startup configuration: flags with environment-variable fallbacks.
//!
//! Validation happens once in [`Cli::into_settings`]; a run only ever sees a
//! validated [`Settings`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::ingest::providers::KNOWN_SOURCES;
use crate::notify::TelegramConfig;
use crate::pipeline::RunConfig;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "rental-watcher",
    version,
    about = "Watch rental listing sites and push new matches to Telegram"
)]
pub struct Cli {
    /// City to search
    #[arg(long, env = "CITY", default_value = "Vaasa")]
    pub city: String,

    /// Rent ceiling in euros per month
    #[arg(long = "max-rent", visible_alias = "max", env = "MAX_RENT", default_value_t = 850)]
    pub max_rent: u32,

    /// Seconds to wait between listing sites
    #[arg(long, env = "PAUSE", default_value_t = 1.5)]
    pub pause: f64,

    /// Seen-listings store
    #[arg(long = "seen", env = "SEEN_PATH", default_value = "seen_listings.json")]
    pub seen_path: PathBuf,

    /// Seconds between runs; 0 runs once and exits
    #[arg(long, env = "INTERVAL", default_value_t = 0)]
    pub interval: u64,

    /// Most listing notifications per run
    #[arg(long, env = "MAX_PUSH", default_value_t = 8)]
    pub max_push: usize,

    /// Milliseconds between consecutive notifications
    #[arg(long, env = "SEND_SPACING_MS", default_value_t = 800)]
    pub send_spacing_ms: u64,

    /// Timeout in seconds for every outbound HTTP call
    #[arg(long = "http-timeout", env = "HTTP_TIMEOUT_SECS", default_value_t = 20)]
    pub http_timeout: u64,

    /// Comma-separated listing sites, fetched in this order
    #[arg(
        long,
        env = "SOURCES",
        value_delimiter = ',',
        default_value = "vuokraovi,oikotie,qasa"
    )]
    pub sources: Vec<String>,

    /// Serve GET /health on this address while polling
    #[arg(long, env = "HEALTH_ADDR")]
    pub health_addr: Option<SocketAddr>,

    /// Also expose Prometheus metrics on the health server
    #[arg(long, env = "METRICS_ENABLED")]
    pub metrics: bool,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub run: RunConfig,
    /// None means run once.
    pub interval: Option<Duration>,
    pub max_push: usize,
    pub send_spacing: Duration,
    pub http_timeout: Duration,
    pub sources: Vec<String>,
    pub health_addr: Option<SocketAddr>,
    pub metrics: bool,
    pub telegram: TelegramConfig,
}

impl Cli {
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let bot_token = required(self.telegram_token, "TELEGRAM_BOT_TOKEN")?;
        let chat_id = required(self.telegram_chat_id, "TELEGRAM_CHAT_ID")?;

        let city = self.city.trim().to_string();
        if city.is_empty() {
            return Err(ConfigError::invalid("CITY", "must not be empty"));
        }

        let pause = Duration::try_from_secs_f64(self.pause).map_err(|_| {
            ConfigError::invalid(
                "PAUSE",
                format!("expected a non-negative number of seconds, got {}", self.pause),
            )
        })?;

        if self.http_timeout == 0 {
            return Err(ConfigError::invalid("HTTP_TIMEOUT_SECS", "must be at least 1"));
        }

        let sources: Vec<String> = self
            .sources
            .iter()
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if sources.is_empty() {
            return Err(ConfigError::invalid("SOURCES", "no listing sites selected"));
        }
        if let Some(unknown) = sources.iter().find(|s| !KNOWN_SOURCES.contains(&s.as_str())) {
            return Err(ConfigError::invalid(
                "SOURCES",
                format!("unknown site '{unknown}', expected one of {}", KNOWN_SOURCES.join(", ")),
            ));
        }

        Ok(Settings {
            run: RunConfig {
                city,
                max_rent: self.max_rent,
                pause,
                seen_path: self.seen_path,
            },
            interval: (self.interval > 0).then(|| Duration::from_secs(self.interval)),
            max_push: self.max_push,
            send_spacing: Duration::from_millis(self.send_spacing_ms),
            http_timeout: Duration::from_secs(self.http_timeout),
            sources,
            health_addr: self.health_addr,
            metrics: self.metrics,
            telegram: TelegramConfig { bot_token, chat_id },
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_KEYS: &[&str] = &[
        "CITY",
        "MAX_RENT",
        "PAUSE",
        "SEEN_PATH",
        "INTERVAL",
        "MAX_PUSH",
        "SEND_SPACING_MS",
        "HTTP_TIMEOUT_SECS",
        "SOURCES",
        "HEALTH_ADDR",
        "METRICS_ENABLED",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
    ];

    fn clean_env() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    fn parse(args: &[&str]) -> Result<Settings, ConfigError> {
        let mut argv = vec!["rental-watcher"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("argv parses").into_settings()
    }

    #[serial_test::serial]
    #[test]
    fn defaults_match_documented_values() {
        clean_env();
        let s = parse(&["--telegram-token", "123:ABC", "--telegram-chat-id", "42"]).unwrap();
        assert_eq!(s.run.city, "Vaasa");
        assert_eq!(s.run.max_rent, 850);
        assert_eq!(s.run.pause, Duration::from_millis(1500));
        assert_eq!(s.run.seen_path, PathBuf::from("seen_listings.json"));
        assert_eq!(s.interval, None);
        assert_eq!(s.max_push, 8);
        assert_eq!(s.send_spacing, Duration::from_millis(800));
        assert_eq!(s.http_timeout, Duration::from_secs(20));
        assert_eq!(s.sources, vec!["vuokraovi", "oikotie", "qasa"]);
        assert_eq!(s.health_addr, None);
        assert!(!s.metrics);
        assert_eq!(s.telegram.chat_id, "42");
    }

    #[serial_test::serial]
    #[test]
    fn missing_credentials_are_fatal() {
        clean_env();
        let err = parse(&["--telegram-chat-id", "42"]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN"));

        let err = parse(&["--telegram-token", "123:ABC", "--telegram-chat-id", "  "]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_CHAT_ID"));
    }

    #[serial_test::serial]
    #[test]
    fn env_supplies_values() {
        clean_env();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "123:ABC");
        std::env::set_var("TELEGRAM_CHAT_ID", "42");
        std::env::set_var("INTERVAL", "600");
        std::env::set_var("SOURCES", "Qasa, oikotie");
        let s = parse(&["--max", "700"]);
        clean_env();

        let s = s.unwrap();
        assert_eq!(s.interval, Some(Duration::from_secs(600)));
        assert_eq!(s.sources, vec!["qasa", "oikotie"]);
        assert_eq!(s.run.max_rent, 700);
    }

    #[serial_test::serial]
    #[test]
    fn rejects_unknown_sources_and_bad_pause() {
        clean_env();
        let base = ["--telegram-token", "t", "--telegram-chat-id", "1"];

        let mut args = base.to_vec();
        args.extend(["--sources", "vuokraovi,blocket"]);
        assert!(matches!(parse(&args), Err(ConfigError::Invalid { field: "SOURCES", .. })));

        let mut args = base.to_vec();
        args.extend(["--pause=-1"]);
        assert!(matches!(parse(&args), Err(ConfigError::Invalid { field: "PAUSE", .. })));
    }
}
