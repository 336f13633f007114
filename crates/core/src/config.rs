use crate::settlement::PayoutTier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub feed: FeedConfig,
    pub trading: TradingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for JWT signing. Override via `APP_AUTH__JWT_SECRET` in
    /// any real deployment.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
}

/// Price feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Tick interval for the simulated feed.
    pub tick_interval_ms: u64,
    /// Settlement refuses quotes older than this.
    pub stale_after_secs: i64,
    /// Symbols the desk quotes, with their starting prices.
    pub symbols: Vec<SymbolConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub symbol: String,
    pub start_price: Decimal,
    /// Per-tick move bound in basis points of the current price.
    pub volatility_bps: u32,
}

/// Trade placement and settlement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    pub min_stake: Decimal,
    pub max_stake: Decimal,
    /// Durations (seconds) a trade may run for.
    pub allowed_durations_secs: Vec<i64>,
    /// Payout buckets by duration; see `PayoutSchedule`.
    pub payout_tiers: Vec<PayoutTier>,
    /// Expiry scheduler poll interval.
    pub settle_poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/optiondesk".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "dev-only-secret".to_string(),
                token_ttl_secs: 86_400,
                bcrypt_cost: 10,
            },
            feed: FeedConfig {
                tick_interval_ms: 1_000,
                stale_after_secs: 10,
                symbols: vec![
                    SymbolConfig {
                        symbol: "BTCUSDT".to_string(),
                        start_price: Decimal::from(50_000),
                        volatility_bps: 20,
                    },
                    SymbolConfig {
                        symbol: "ETHUSDT".to_string(),
                        start_price: Decimal::from(3_000),
                        volatility_bps: 30,
                    },
                ],
            },
            trading: TradingConfig {
                min_stake: Decimal::from(10),
                max_stake: Decimal::from(10_000),
                allowed_durations_secs: vec![30, 60, 120, 300],
                payout_tiers: vec![
                    PayoutTier {
                        max_duration_secs: 60,
                        rate: Decimal::new(85, 2),
                    },
                    PayoutTier {
                        max_duration_secs: 300,
                        rate: Decimal::new(88, 2),
                    },
                    PayoutTier {
                        max_duration_secs: i64::MAX,
                        rate: Decimal::new(90, 2),
                    },
                ],
                settle_poll_interval_ms: 1_000,
            },
        }
    }
}
