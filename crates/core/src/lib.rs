pub mod config;
pub mod config_loader;
pub mod error;
pub mod settlement;
pub mod types;

pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, FeedConfig, ServerConfig, SymbolConfig, TradingConfig,
};
pub use config_loader::ConfigLoader;
pub use error::{DeskError, DeskResult};
pub use settlement::{decide, profit, PayoutSchedule, PayoutTier, SettlementDecision};
pub use types::{
    TradeDirection, TradeOutcome, TradeStatus, TradingMode, TransactionKind, TransactionStatus,
    UserRole, UserStatus,
};
