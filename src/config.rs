use std::env;

use crate::constants::{MAX_INFLIGHT_FETCHES, SIGNATURE_FETCH_LIMIT, UPSTREAM_TIMEOUT_SECS};

/// What to do with per-item upstream failures inside a batch: log and drop
/// them (the default), or additionally report them in the response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Drop,
    Collect,
}

impl FailurePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "drop" => Some(Self::Drop),
            "collect" => Some(Self::Collect),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Blockchain
    pub solana_rpc_url: String,

    // Metadata catalog
    pub metadata_api_url: String,
    pub metadata_api_key: Option<String>,

    // Lookup behavior
    pub signature_fetch_limit: usize,
    pub max_inflight_fetches: usize,
    pub item_failure_policy: FailurePolicy,
    pub request_timeout_secs: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            solana_rpc_url: env::var("SOLANA_RPC_URL")
                .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string()),

            metadata_api_url: env::var("METADATA_API_URL")?,
            metadata_api_key: env::var("METADATA_API_KEY").ok(),

            signature_fetch_limit: env::var("SIGNATURE_FETCH_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(SIGNATURE_FETCH_LIMIT),
            max_inflight_fetches: env::var("MAX_INFLIGHT_FETCHES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_INFLIGHT_FETCHES),
            item_failure_policy: env::var("ITEM_FAILURE_POLICY")
                .ok()
                .as_deref()
                .and_then(FailurePolicy::parse)
                .unwrap_or(FailurePolicy::Drop),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(UPSTREAM_TIMEOUT_SECS),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.solana_rpc_url.trim().is_empty() {
            anyhow::bail!("SOLANA_RPC_URL is empty");
        }
        if self.metadata_api_url.trim().is_empty() {
            anyhow::bail!("METADATA_API_URL is empty");
        }
        url::Url::parse(&self.solana_rpc_url)
            .map_err(|e| anyhow::anyhow!("SOLANA_RPC_URL is not a valid URL: {}", e))?;
        url::Url::parse(&self.metadata_api_url)
            .map_err(|e| anyhow::anyhow!("METADATA_API_URL is not a valid URL: {}", e))?;

        if looks_like_placeholder(&self.metadata_api_url) {
            tracing::warn!(
                "METADATA_API_URL looks like a placeholder: {}",
                self.metadata_api_url
            );
        }
        if let Some(key) = &self.metadata_api_key {
            if looks_like_placeholder(key) {
                tracing::warn!("METADATA_API_KEY looks like a placeholder");
            }
        }

        if self.max_inflight_fetches == 0 {
            anyhow::bail!("MAX_INFLIGHT_FETCHES must be > 0");
        }
        if self.signature_fetch_limit == 0 {
            tracing::warn!("SIGNATURE_FETCH_LIMIT is 0; activity lookups will be empty");
        }
        if self.signature_fetch_limit > 100 {
            tracing::warn!(
                "SIGNATURE_FETCH_LIMIT {} is large; expect slow activity lookups",
                self.signature_fetch_limit
            );
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_devnet(&self) -> bool {
        if self.environment == "development" || self.environment == "devnet" {
            return true;
        }
        self.solana_rpc_url.contains("devnet") || self.solana_rpc_url.contains("testnet")
    }
}

// Boilerplate values commonly left behind from .env templates.
fn looks_like_placeholder(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    ["example.com", "your-", "your_", "changeme", "placeholder"]
        .iter()
        .any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_values_are_recognized() {
        assert!(looks_like_placeholder("https://api.example.com"));
        assert!(looks_like_placeholder("YOUR-API-KEY"));
        assert!(looks_like_placeholder("changeme"));
        assert!(!looks_like_placeholder("https://api.helius.xyz"));
    }

    #[test]
    fn validate_accepts_placeholder_url_with_warning_only() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "test".to_string(),
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            metadata_api_url: "https://api.example.com".to_string(),
            metadata_api_key: None,
            signature_fetch_limit: 20,
            max_inflight_fetches: 8,
            item_failure_policy: FailurePolicy::Drop,
            request_timeout_secs: 10,
            cors_allowed_origins: "*".to_string(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn failure_policy_parses_known_values() {
        assert_eq!(FailurePolicy::parse("drop"), Some(FailurePolicy::Drop));
        assert_eq!(FailurePolicy::parse(" Collect "), Some(FailurePolicy::Collect));
    }

    #[test]
    fn failure_policy_rejects_unknown_values() {
        assert_eq!(FailurePolicy::parse("retry"), None);
        assert_eq!(FailurePolicy::parse(""), None);
    }
}
