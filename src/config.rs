use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "data/lotto.db";
pub const DEFAULT_SIMULATED_DELAY_MS: u64 = 800;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub simulated_delay_ms: u64,
}

impl Config {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

/// Reads `LOTTO_DB_PATH` and `LOTTO_SIMULATED_DELAY_MS`.
pub fn load() -> Result<Config> {
    from_values(
        env::var("LOTTO_DB_PATH").ok(),
        env::var("LOTTO_SIMULATED_DELAY_MS").ok(),
    )
}

fn from_values(database_url: Option<String>, simulated_delay_ms: Option<String>) -> Result<Config> {
    let database_url = database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let simulated_delay_ms = match simulated_delay_ms {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("LOTTO_SIMULATED_DELAY_MS is not a number: {:?}", raw))?,
        None => DEFAULT_SIMULATED_DELAY_MS,
    };

    Ok(Config {
        database_url,
        simulated_delay_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = from_values(None, None).unwrap();
        assert_eq!(config.database_url, "data/lotto.db");
        assert_eq!(config.simulated_delay(), Duration::from_millis(800));
    }

    #[test]
    fn overrides() {
        let config = from_values(Some("/tmp/x.db".to_string()), Some(" 0 ".to_string())).unwrap();
        assert_eq!(config.database_url, "/tmp/x.db");
        assert_eq!(config.simulated_delay_ms, 0);
    }

    #[test]
    fn bad_delay_is_an_error() {
        assert!(from_values(None, Some("soon".to_string())).is_err());
    }
}
