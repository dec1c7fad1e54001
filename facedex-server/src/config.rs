//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Root directory of the filesystem object store (default: ./storage)
    pub storage_root: String,
    /// Postgres connection string; None falls back to the in-memory face store
    pub database_url: Option<String>,
    /// Connection-establishment / pool-acquire timeout in seconds (default: 5)
    pub connect_timeout_secs: u64,
    /// Lease TTL after which an offered-but-unnamed face becomes claimable
    /// again, in seconds (default: 300)
    pub claim_lease_secs: u64,
    /// Bind naming replies to the originally offered face instead of
    /// re-selecting an unnamed face at labeling time (default: false,
    /// matching the historical behavior)
    pub bind_offer: bool,
    /// Public base URL the bot embeds in gateway links (default: derived
    /// from host/port)
    pub gateway_base_url: String,
    /// Request body limit in MB (default: 25)
    pub body_limit_mb: usize,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Queue consumer: messages pulled per batch (default: 10)
    pub consume_batch_size: usize,
    /// Queue consumer: idle poll interval in milliseconds (default: 500)
    pub consume_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            storage_root: "./storage".into(),
            database_url: None,
            connect_timeout_secs: 5,
            claim_lease_secs: 300,
            bind_offer: false,
            gateway_base_url: "http://127.0.0.1:3000".into(),
            body_limit_mb: 25,
            timeout_secs: 30,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            consume_batch_size: 10,
            consume_poll_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or([127, 0, 0, 1]);

        let storage_root =
            std::env::var("FACEDEX_STORAGE_ROOT").unwrap_or_else(|_| "./storage".into());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let connect_timeout_secs = std::env::var("FACEDEX_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let claim_lease_secs = std::env::var("FACEDEX_CLAIM_LEASE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let bind_offer = std::env::var("FACEDEX_BIND_OFFER")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let gateway_base_url = std::env::var("FACEDEX_GATEWAY_URL")
            .unwrap_or_else(|_| format!("http://{}.{}.{}.{}:{port}", host[0], host[1], host[2], host[3]));

        let body_limit_mb = std::env::var("BODY_LIMIT_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(25);

        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        // Rate limiting enabled by default in production, can be disabled
        // with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let rate_limit_per_sec = std::env::var("RATE_LIMIT_PER_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let rate_limit_burst = std::env::var("RATE_LIMIT_BURST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let consume_batch_size = std::env::var("FACEDEX_CONSUME_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let consume_poll_ms = std::env::var("FACEDEX_CONSUME_POLL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);

        Self {
            port,
            host,
            storage_root,
            database_url,
            connect_timeout_secs,
            claim_lease_secs,
            bind_offer,
            gateway_base_url,
            body_limit_mb,
            timeout_secs,
            rate_limit_enabled,
            rate_limit_per_sec,
            rate_limit_burst,
            consume_batch_size,
            consume_poll_ms,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn claim_lease(&self) -> Duration {
        Duration::from_secs(self.claim_lease_secs)
    }
}
