//! Price feed and quote board.
//!
//! The board holds the freshest quote per symbol; settlement reads go
//! through [`PriceBoard::fresh_quote`] which refuses quotes older than the
//! configured staleness bound. The feed itself sits behind a trait so the
//! simulated random walk can be swapped for a real market source.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use optiondesk_core::config::{FeedConfig, SymbolConfig};
use optiondesk_core::error::{DeskError, DeskResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::events::{DeskEvent, PriceQuote};

/// Shared latest-quote store.
#[derive(Debug, Clone)]
pub struct PriceBoard {
    quotes: Arc<RwLock<HashMap<String, PriceQuote>>>,
    stale_after_secs: i64,
}

impl PriceBoard {
    /// Creates an empty board with the given staleness bound.
    #[must_use]
    pub fn new(stale_after_secs: i64) -> Self {
        Self {
            quotes: Arc::new(RwLock::new(HashMap::new())),
            stale_after_secs,
        }
    }

    /// Stores a quote, replacing any older quote for the symbol.
    pub async fn update(&self, quote: PriceQuote) {
        self.quotes.write().await.insert(quote.symbol.clone(), quote);
    }

    /// Returns the latest quote for a symbol regardless of age.
    #[must_use]
    pub async fn quote(&self, symbol: &str) -> Option<PriceQuote> {
        self.quotes.read().await.get(symbol).cloned()
    }

    /// Returns the latest quote if it is fresh enough to settle against.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown symbol and `StalePrice` when the
    /// latest quote is older than the staleness bound.
    pub async fn fresh_quote(&self, symbol: &str, now: DateTime<Utc>) -> DeskResult<PriceQuote> {
        let quote = self.quote(symbol).await.ok_or(DeskError::NotFound {
            kind: "symbol",
            id: symbol.to_string(),
        })?;

        let age = quote.age_secs(now);
        if age > self.stale_after_secs {
            return Err(DeskError::StalePrice {
                symbol: symbol.to_string(),
                age_secs: age,
            });
        }
        Ok(quote)
    }

    /// Lists symbols with at least one quote.
    #[must_use]
    pub async fn symbols(&self) -> Vec<String> {
        self.quotes.read().await.keys().cloned().collect()
    }
}

/// Source of price quotes.
pub trait PriceFeed: Send {
    /// Produces the next quote for every symbol this feed covers.
    fn next_quotes(&mut self, now: DateTime<Utc>) -> Vec<PriceQuote>;
}

/// Bounded random-walk feed for development and testing.
///
/// Each tick moves every symbol by a uniform factor within its configured
/// volatility in basis points, with a floor so prices never reach zero.
pub struct SimulatedPriceFeed {
    symbols: Vec<SimulatedSymbol>,
    rng: StdRng,
}

struct SimulatedSymbol {
    symbol: String,
    price: Decimal,
    volatility_bps: i64,
}

impl SimulatedPriceFeed {
    /// Creates a feed seeded from the OS entropy source.
    #[must_use]
    pub fn new(symbols: &[SymbolConfig]) -> Self {
        Self::with_rng(symbols, StdRng::from_entropy())
    }

    /// Creates a feed with a fixed seed for deterministic tests.
    #[must_use]
    pub fn with_seed(symbols: &[SymbolConfig], seed: u64) -> Self {
        Self::with_rng(symbols, StdRng::seed_from_u64(seed))
    }

    fn with_rng(symbols: &[SymbolConfig], rng: StdRng) -> Self {
        let symbols = symbols
            .iter()
            .map(|s| SimulatedSymbol {
                symbol: s.symbol.clone(),
                price: s.start_price,
                volatility_bps: i64::from(s.volatility_bps),
            })
            .collect();
        Self { symbols, rng }
    }
}

impl PriceFeed for SimulatedPriceFeed {
    fn next_quotes(&mut self, now: DateTime<Utc>) -> Vec<PriceQuote> {
        self.symbols
            .iter_mut()
            .map(|s| {
                let offset_bps = self.rng.gen_range(-s.volatility_bps..=s.volatility_bps);
                let factor = Decimal::ONE + Decimal::new(offset_bps, 4);
                let next = (s.price * factor).round_dp(2);
                if next > Decimal::ZERO {
                    s.price = next;
                }
                PriceQuote {
                    symbol: s.symbol.clone(),
                    price: s.price,
                    timestamp: now,
                }
            })
            .collect()
    }
}

/// Drives a feed on the configured tick interval, publishing every quote to
/// the board and broadcasting a price tick event.
///
/// Runs until the process shuts down; spawn it on its own task.
pub async fn run_feed(
    mut feed: impl PriceFeed,
    board: PriceBoard,
    events: broadcast::Sender<DeskEvent>,
    config: &FeedConfig,
) {
    let mut interval =
        tokio::time::interval(std::time::Duration::from_millis(config.tick_interval_ms));
    info!(tick_ms = config.tick_interval_ms, "price feed started");

    loop {
        interval.tick().await;
        let now = Utc::now();
        for quote in feed.next_quotes(now) {
            debug!(symbol = %quote.symbol, price = %quote.price, "price tick");
            board.update(quote.clone()).await;
            // Send only fails with no subscribers, which is fine.
            let _ = events.send(DeskEvent::PriceTick(quote));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn symbol_config() -> Vec<SymbolConfig> {
        vec![SymbolConfig {
            symbol: "BTCUSDT".to_string(),
            start_price: dec!(50000),
            volatility_bps: 20,
        }]
    }

    #[test]
    fn walk_stays_within_volatility() {
        let mut feed = SimulatedPriceFeed::with_seed(&symbol_config(), 42);
        let mut prev = dec!(50000);

        for _ in 0..200 {
            let quotes = feed.next_quotes(Utc::now());
            assert_eq!(quotes.len(), 1);
            let price = quotes[0].price;
            assert!(price > Decimal::ZERO);

            // 20 bps bound per tick, plus rounding slack.
            let max_move = prev * dec!(0.0021);
            assert!((price - prev).abs() <= max_move, "move too large: {prev} -> {price}");
            prev = price;
        }
    }

    #[test]
    fn seeded_walk_is_deterministic() {
        let mut a = SimulatedPriceFeed::with_seed(&symbol_config(), 7);
        let mut b = SimulatedPriceFeed::with_seed(&symbol_config(), 7);
        let now = Utc::now();

        for _ in 0..50 {
            assert_eq!(a.next_quotes(now), b.next_quotes(now));
        }
    }

    #[tokio::test]
    async fn board_serves_fresh_quotes() {
        let board = PriceBoard::new(5);
        let now = Utc::now();
        board
            .update(PriceQuote {
                symbol: "BTCUSDT".to_string(),
                price: dec!(50000),
                timestamp: now,
            })
            .await;

        let quote = board.fresh_quote("BTCUSDT", now).await.unwrap();
        assert_eq!(quote.price, dec!(50000));
    }

    #[tokio::test]
    async fn board_refuses_stale_quotes() {
        let board = PriceBoard::new(5);
        let now = Utc::now();
        board
            .update(PriceQuote {
                symbol: "BTCUSDT".to_string(),
                price: dec!(50000),
                timestamp: now - chrono::Duration::seconds(10),
            })
            .await;

        let err = board.fresh_quote("BTCUSDT", now).await.unwrap_err();
        assert!(matches!(err, DeskError::StalePrice { age_secs: 10, .. }));
    }

    #[tokio::test]
    async fn board_unknown_symbol_is_not_found() {
        let board = PriceBoard::new(5);
        let err = board.fresh_quote("DOGEUSDT", Utc::now()).await.unwrap_err();
        assert!(matches!(err, DeskError::NotFound { kind: "symbol", .. }));
    }
}
