use std::time::Duration;

use crate::Error;

/// Runtime settings, read once from the environment (a `.env` file is honored
/// when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Admin account ids, e.g. `ADMIN_IDS=[123, 456]`.
    pub admin_ids: Vec<i64>,
    pub poll_interval: Duration,
    pub subscription_interval: Duration,
    pub marketing_interval: Duration,
    /// UTC hour at which the morning digest goes out.
    pub digest_hour: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| "missing DATABASE_URL")?;
        let admin_ids = match std::env::var("ADMIN_IDS") {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| format!("invalid ADMIN_IDS: {e}"))?,
            Err(_) => Vec::new(),
        };
        let digest_hour = env_u64("DIGEST_HOUR_UTC", 9)?;
        if digest_hour > 23 {
            return Err("DIGEST_HOUR_UTC must be between 0 and 23".into());
        }

        Ok(Self {
            database_url,
            admin_ids,
            poll_interval: Duration::from_secs(env_u64("REMINDER_POLL_SECS", 60)?),
            subscription_interval: Duration::from_secs(env_u64(
                "SUBSCRIPTION_CHECK_SECS",
                24 * 3600,
            )?),
            marketing_interval: Duration::from_secs(env_u64("MARKETING_CHECK_SECS", 12 * 3600)?),
            digest_hour: digest_hour as u32,
        })
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64, Error> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| format!("invalid {key}: {e}").into()),
        Err(_) => Ok(default),
    }
}
