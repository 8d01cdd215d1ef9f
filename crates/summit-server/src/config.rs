use std::env;

use summit_app::escalation_service::EngineConfig;
use summit_app::monitor::DEFAULT_SWEEP_INTERVAL_MINUTES;
use summit_core::ids::UserId;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub sweep_interval_minutes: u64,
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Reads DATABASE_URL, SWEEP_INTERVAL_MINUTES and FALLBACK_RESPONDER
    /// from the environment. Missing values fall back to a local sqlite
    /// file and the default interval; a malformed value is an error.
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:summit.db?mode=rwc".to_string());

        let sweep_interval_minutes = match env::var("SWEEP_INTERVAL_MINUTES") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| format!("SWEEP_INTERVAL_MINUTES is not a number: {raw}"))?,
            Err(_) => DEFAULT_SWEEP_INTERVAL_MINUTES,
        };
        if sweep_interval_minutes == 0 {
            return Err("SWEEP_INTERVAL_MINUTES must be at least 1".into());
        }

        let fallback_responder = match env::var("FALLBACK_RESPONDER") {
            Ok(raw) => Some(
                UserId::parse(&raw)
                    .map_err(|_| format!("FALLBACK_RESPONDER is not a user id: {raw}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            sweep_interval_minutes,
            engine: EngineConfig { fallback_responder },
        })
    }
}
