//! Settlement policy for binary-options trades.
//!
//! The policy is a pure function from (direction, entry price, exit price,
//! trading mode) to a settlement decision. The admin override is an input to
//! the decision, not a patch applied to an already-computed result, and the
//! decision records whether the outcome was forced so the audit trail can
//! distinguish forced settlements from genuine ones.
//!
//! # Outcome rules
//! - Up wins iff exit > entry; Down wins iff exit < entry.
//! - A flat price at expiry (exit == entry) loses for both directions.
//! - `TradingMode::Win`/`Lose` force the outcome regardless of prices.

use crate::types::{TradeDirection, TradeOutcome, TradingMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One payout bucket: trades with `duration_secs <= max_duration_secs`
/// settle at `rate` (fraction of stake paid on a win).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutTier {
    pub max_duration_secs: i64,
    pub rate: Decimal,
}

/// Ordered payout buckets keyed by trade duration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutSchedule {
    tiers: Vec<PayoutTier>,
}

impl Default for PayoutSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
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
        }
    }
}

impl PayoutSchedule {
    /// Creates a schedule from tiers sorted by `max_duration_secs`.
    ///
    /// # Errors
    /// Returns an error if the tier list is empty, unsorted, or contains a
    /// rate outside (0, 1).
    pub fn new(tiers: Vec<PayoutTier>) -> anyhow::Result<Self> {
        if tiers.is_empty() {
            anyhow::bail!("payout schedule requires at least one tier");
        }
        for window in tiers.windows(2) {
            if window[0].max_duration_secs >= window[1].max_duration_secs {
                anyhow::bail!("payout tiers must be strictly increasing by duration");
            }
        }
        for tier in &tiers {
            if tier.rate <= Decimal::ZERO || tier.rate >= Decimal::ONE {
                anyhow::bail!("payout rate {} outside (0, 1)", tier.rate);
            }
        }
        Ok(Self { tiers })
    }

    /// Returns the payout rate for a trade of the given duration.
    ///
    /// The first tier whose bound covers the duration applies; durations past
    /// every bound fall back to the last tier.
    #[must_use]
    pub fn rate_for(&self, duration_secs: i64) -> Decimal {
        self.tiers
            .iter()
            .find(|t| duration_secs <= t.max_duration_secs)
            .unwrap_or_else(|| self.tiers.last().expect("schedule is non-empty"))
            .rate
    }
}

/// Outcome decision for a single trade settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementDecision {
    /// Outcome implied by actual price movement.
    pub natural: TradeOutcome,
    /// Outcome after the trading-mode override.
    pub outcome: TradeOutcome,
    /// True iff the override changed the natural outcome.
    pub forced: bool,
    /// Trading mode that was in effect at settlement.
    pub mode: TradingMode,
}

/// Decides the outcome of a trade at expiry.
#[must_use]
pub fn decide(
    direction: TradeDirection,
    entry_price: Decimal,
    exit_price: Decimal,
    mode: TradingMode,
) -> SettlementDecision {
    let natural = match direction {
        TradeDirection::Up if exit_price > entry_price => TradeOutcome::Win,
        TradeDirection::Down if exit_price < entry_price => TradeOutcome::Win,
        _ => TradeOutcome::Loss,
    };

    let outcome = match mode {
        TradingMode::Normal => natural,
        TradingMode::Win => TradeOutcome::Win,
        TradingMode::Lose => TradeOutcome::Loss,
    };

    SettlementDecision {
        natural,
        outcome,
        forced: outcome != natural,
        mode,
    }
}

/// Computes the balance effect of a settled trade.
///
/// Win pays `stake * rate`; loss costs the full stake. Independent of
/// whether the outcome was forced.
#[must_use]
pub fn profit(outcome: TradeOutcome, stake: Decimal, rate: Decimal) -> Decimal {
    match outcome {
        TradeOutcome::Win => stake * rate,
        TradeOutcome::Loss => -stake,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn up_wins_when_price_rises() {
        let d = decide(
            TradeDirection::Up,
            dec!(50000),
            dec!(50500),
            TradingMode::Normal,
        );
        assert_eq!(d.outcome, TradeOutcome::Win);
        assert_eq!(d.natural, TradeOutcome::Win);
        assert!(!d.forced);
    }

    #[test]
    fn down_wins_when_price_falls() {
        let d = decide(
            TradeDirection::Down,
            dec!(50000),
            dec!(49000),
            TradingMode::Normal,
        );
        assert_eq!(d.outcome, TradeOutcome::Win);
        assert!(!d.forced);
    }

    #[test]
    fn flat_price_loses_both_directions() {
        for direction in [TradeDirection::Up, TradeDirection::Down] {
            let d = decide(direction, dec!(50000), dec!(50000), TradingMode::Normal);
            assert_eq!(d.outcome, TradeOutcome::Loss);
            assert!(!d.forced);
        }
    }

    #[test]
    fn win_mode_forces_win_against_price() {
        // Price moved against the trade; override wins anyway.
        let d = decide(
            TradeDirection::Up,
            dec!(50000),
            dec!(49000),
            TradingMode::Win,
        );
        assert_eq!(d.natural, TradeOutcome::Loss);
        assert_eq!(d.outcome, TradeOutcome::Win);
        assert!(d.forced);
    }

    #[test]
    fn lose_mode_forces_loss_against_price() {
        let d = decide(
            TradeDirection::Up,
            dec!(50000),
            dec!(50500),
            TradingMode::Lose,
        );
        assert_eq!(d.natural, TradeOutcome::Win);
        assert_eq!(d.outcome, TradeOutcome::Loss);
        assert!(d.forced);
    }

    #[test]
    fn override_agreeing_with_price_is_not_forced() {
        let d = decide(
            TradeDirection::Up,
            dec!(50000),
            dec!(50500),
            TradingMode::Win,
        );
        assert_eq!(d.outcome, TradeOutcome::Win);
        assert!(!d.forced);
    }

    #[test]
    fn profit_win_is_stake_times_rate() {
        assert_eq!(profit(TradeOutcome::Win, dec!(100), dec!(0.85)), dec!(85));
    }

    #[test]
    fn profit_loss_is_negative_stake() {
        assert_eq!(
            profit(TradeOutcome::Loss, dec!(100), dec!(0.85)),
            dec!(-100)
        );
    }

    #[test]
    fn hundred_dollar_trade_normal_and_forced() {
        // $100 up trade, entry 50000, exit 50500, 30s duration.
        let schedule = PayoutSchedule::default();
        let rate = schedule.rate_for(30);
        assert_eq!(rate, dec!(0.85));

        let natural = decide(
            TradeDirection::Up,
            dec!(50000),
            dec!(50500),
            TradingMode::Normal,
        );
        assert_eq!(profit(natural.outcome, dec!(100), rate), dec!(85));

        let forced = decide(
            TradeDirection::Up,
            dec!(50000),
            dec!(50500),
            TradingMode::Lose,
        );
        assert_eq!(profit(forced.outcome, dec!(100), rate), dec!(-100));
        assert!(forced.forced);
    }

    #[test]
    fn payout_schedule_buckets() {
        let schedule = PayoutSchedule::default();
        assert_eq!(schedule.rate_for(30), dec!(0.85));
        assert_eq!(schedule.rate_for(60), dec!(0.85));
        assert_eq!(schedule.rate_for(120), dec!(0.88));
        assert_eq!(schedule.rate_for(3600), dec!(0.90));
    }

    #[test]
    fn payout_schedule_rejects_bad_tiers() {
        assert!(PayoutSchedule::new(vec![]).is_err());
        assert!(PayoutSchedule::new(vec![
            PayoutTier {
                max_duration_secs: 60,
                rate: dec!(0.85)
            },
            PayoutTier {
                max_duration_secs: 30,
                rate: dec!(0.88)
            },
        ])
        .is_err());
        assert!(PayoutSchedule::new(vec![PayoutTier {
            max_duration_secs: 60,
            rate: dec!(1.5)
        }])
        .is_err());
    }

    #[test]
    fn decide_is_deterministic() {
        let a = decide(
            TradeDirection::Down,
            dec!(100),
            dec!(99.5),
            TradingMode::Normal,
        );
        let b = decide(
            TradeDirection::Down,
            dec!(100),
            dec!(99.5),
            TradingMode::Normal,
        );
        assert_eq!(a, b);
    }
}
