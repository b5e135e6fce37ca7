use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL; the in-memory store is used when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Endpoint of the optional text generation service
    #[serde(default)]
    pub text_api_url: Option<String>,

    /// API key for the text generation service
    #[serde(default)]
    pub text_api_key: Option<String>,

    /// Seed for the recommendation RNG; unset means OS entropy
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let vars: Vec<(String, String)> = vec![];
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert!(config.redis_url.is_none());
        assert!(config.rng_seed.is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_reads_optional_values() {
        let vars = vec![
            ("REDIS_URL".to_string(), "redis://localhost:6379".to_string()),
            ("RNG_SEED".to_string(), "42".to_string()),
            ("PORT".to_string(), "8080".to_string()),
        ];
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.port, 8080);
    }
}
