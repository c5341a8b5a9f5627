use serde::Deserialize;

/// Server configuration, loaded from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Milliseconds for one request of a client IP's quota to replenish on the predict routes.
    pub rate_limit_replenish_ms: u64,
    /// Requests a client IP may burst above the sustained rate.
    pub rate_limit_burst: u32,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            rate_limit_replenish_ms: 100,
            rate_limit_burst: 20,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            port: match lookup("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
                None => defaults.port,
            },
            rate_limit_replenish_ms: match lookup("RATE_LIMIT_REPLENISH_MS") {
                Some(rate) => rate
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("RATE_LIMIT_REPLENISH_MS must be a positive number"))
                    .and_then(|rate| {
                        if rate == 0 {
                            anyhow::bail!("RATE_LIMIT_REPLENISH_MS cannot be zero");
                        }
                        Ok(rate)
                    })?,
                None => defaults.rate_limit_replenish_ms,
            },
            rate_limit_burst: match lookup("RATE_LIMIT_BURST") {
                Some(burst) => burst
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive number"))
                    .and_then(|burst| {
                        if burst == 0 {
                            anyhow::bail!("RATE_LIMIT_BURST cannot be zero");
                        }
                        Ok(burst)
                    })?,
                None => defaults.rate_limit_burst,
            },
            max_body_bytes: match lookup("MAX_BODY_BYTES") {
                Some(limit) => limit
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a number of bytes"))?,
                None => defaults.max_body_bytes,
            },
        };

        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!(
            "Rate limit: one request per {}ms per IP, burst {}",
            config.rate_limit_replenish_ms,
            config.rate_limit_burst
        );
        tracing::debug!("Max body size: {} bytes", config.max_body_bytes);

        Ok(config)
    }
}
