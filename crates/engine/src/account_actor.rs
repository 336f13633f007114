use chrono::Utc;
use optiondesk_core::config::TradingConfig;
use optiondesk_core::error::{DeskError, DeskResult};
use optiondesk_core::settlement::PayoutSchedule;
use optiondesk_core::types::TransactionKind;
use optiondesk_data::ledger::{ClaimedCode, Ledger, SettledTrade};
use optiondesk_data::models::{TradeRecord, TransactionRecord};
use optiondesk_data::Repositories;
use rust_decimal::Decimal;
use tokio::sync::{broadcast, mpsc};
use tracing::info;
use uuid::Uuid;

use crate::commands::{AccountCommand, PlaceTradeRequest};
use crate::events::DeskEvent;
use crate::feed::PriceBoard;

/// Per-user actor serializing all balance-affecting work for one account.
///
/// Ordering within a user comes from the command channel; atomicity of each
/// operation comes from the ledger underneath.
pub struct AccountActor {
    user_id: Uuid,
    rx: mpsc::Receiver<AccountCommand>,
    ledger: Ledger,
    repos: Repositories,
    board: PriceBoard,
    payouts: PayoutSchedule,
    trading: TradingConfig,
    event_tx: broadcast::Sender<DeskEvent>,
}

impl AccountActor {
    /// Creates a new account actor for the given user.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        rx: mpsc::Receiver<AccountCommand>,
        ledger: Ledger,
        repos: Repositories,
        board: PriceBoard,
        payouts: PayoutSchedule,
        trading: TradingConfig,
        event_tx: broadcast::Sender<DeskEvent>,
    ) -> Self {
        Self {
            user_id,
            rx,
            ledger,
            repos,
            board,
            payouts,
            trading,
            event_tx,
        }
    }

    /// Processes commands until shutdown or all handles drop.
    pub async fn run(mut self) {
        info!(user_id = %self.user_id, "account actor started");

        while let Some(command) = self.rx.recv().await {
            match command {
                AccountCommand::PlaceTrade { request, reply } => {
                    let _ = reply.send(self.place_trade(request).await);
                }
                AccountCommand::SettleTrade { trade_id, reply } => {
                    let _ = reply.send(self.settle_trade(trade_id).await);
                }
                AccountCommand::RequestDeposit { amount, reply } => {
                    let _ = reply
                        .send(self.request_funds(TransactionKind::Deposit, amount).await);
                }
                AccountCommand::RequestWithdrawal { amount, reply } => {
                    let _ = reply
                        .send(self.request_funds(TransactionKind::Withdrawal, amount).await);
                }
                AccountCommand::ClaimRedeemCode { code, reply } => {
                    let _ = reply.send(self.claim_code(&code).await);
                }
                AccountCommand::Shutdown => break,
            }
        }

        info!(user_id = %self.user_id, "account actor stopped");
    }

    async fn place_trade(&self, request: PlaceTradeRequest) -> DeskResult<TradeRecord> {
        self.validate_trade(&request)?;

        // An unknown symbol is a bad request, same as a bad stake.
        let now = Utc::now();
        let quote = self
            .board
            .fresh_quote(&request.symbol, now)
            .await
            .map_err(|e| unknown_symbol_to_validation(&request.symbol, e))?;
        let rate = self.payouts.rate_for(request.duration_secs);

        let record = TradeRecord::new(
            self.user_id,
            request.symbol,
            request.direction,
            request.stake,
            request.duration_secs,
            quote.price,
            rate,
            now,
        );

        self.ledger.place_trade(&record).await?;

        let _ = self.event_tx.send(DeskEvent::TradeOpened {
            user_id: self.user_id,
            trade_id: record.id,
            symbol: record.symbol.clone(),
            stake: record.stake,
        });

        Ok(record)
    }

    fn validate_trade(&self, request: &PlaceTradeRequest) -> DeskResult<()> {
        if request.stake < self.trading.min_stake || request.stake > self.trading.max_stake {
            return Err(DeskError::Validation(format!(
                "stake {} outside allowed range {}..={}",
                request.stake, self.trading.min_stake, self.trading.max_stake
            )));
        }
        if !self
            .trading
            .allowed_durations_secs
            .contains(&request.duration_secs)
        {
            return Err(DeskError::Validation(format!(
                "duration {}s is not offered",
                request.duration_secs
            )));
        }
        Ok(())
    }

    async fn settle_trade(&self, trade_id: Uuid) -> DeskResult<Option<SettledTrade>> {
        let trade = self
            .repos
            .trades
            .get_by_id(trade_id)
            .await?
            .ok_or(DeskError::NotFound {
                kind: "trade",
                id: trade_id.to_string(),
            })?;

        if !trade.is_active() {
            return Ok(None);
        }

        // A stale quote defers settlement; the scheduler retries next poll.
        let now = Utc::now();
        let quote = self.board.fresh_quote(&trade.symbol, now).await?;

        let settled = match self.ledger.settle_trade(trade_id, quote.price, now).await {
            Ok(settled) => settled,
            Err(DeskError::TradeNotActive(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let _ = self.event_tx.send(DeskEvent::TradeCompleted {
            user_id: settled.user_id,
            trade_id: settled.trade_id,
            outcome: settled.decision.outcome.as_str().to_string(),
            profit: settled.profit,
            exit_price: settled.exit_price,
            new_balance: settled.new_balance,
        });
        let _ = self.event_tx.send(DeskEvent::BalanceUpdate {
            user_id: settled.user_id,
            balance: settled.new_balance,
        });

        Ok(Some(settled))
    }

    async fn request_funds(
        &self,
        kind: TransactionKind,
        amount: Decimal,
    ) -> DeskResult<TransactionRecord> {
        if amount <= Decimal::ZERO {
            return Err(DeskError::Validation(format!(
                "{} amount must be positive",
                kind.as_str()
            )));
        }

        let user = self
            .repos
            .users
            .get_by_id(self.user_id)
            .await?
            .ok_or(DeskError::NotFound {
                kind: "user",
                id: self.user_id.to_string(),
            })?;
        if !user.is_active() {
            return Err(DeskError::AccountRestricted {
                user_id: self.user_id,
                status: user.status,
            });
        }
        // Early refusal only; approval re-checks funds under the row lock.
        if kind == TransactionKind::Withdrawal && amount > user.balance {
            return Err(DeskError::InsufficientBalance {
                requested: amount,
                available: user.balance,
            });
        }

        let record = TransactionRecord::pending(self.user_id, kind, amount);
        self.repos.transactions.insert(&record).await?;

        info!(
            user_id = %self.user_id,
            transaction_id = %record.id,
            kind = kind.as_str(),
            amount = %amount,
            "funds request created"
        );
        Ok(record)
    }

    async fn claim_code(&self, code: &str) -> DeskResult<ClaimedCode> {
        let claimed = self.ledger.claim_redeem_code(code, self.user_id).await?;

        let _ = self.event_tx.send(DeskEvent::BalanceUpdate {
            user_id: self.user_id,
            balance: claimed.new_balance,
        });

        Ok(claimed)
    }
}

/// Reframes a missing-symbol lookup at placement as a validation failure.
///
/// At settlement the same lookup stays `NotFound`: the symbol was accepted
/// once, so losing it later is not the caller's fault.
fn unknown_symbol_to_validation(symbol: &str, err: DeskError) -> DeskError {
    match err {
        DeskError::NotFound { kind: "symbol", .. } => {
            DeskError::Validation(format!("symbol '{symbol}' is not offered"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::PriceBoard;

    #[tokio::test]
    async fn unknown_symbol_at_placement_is_a_validation_failure() {
        let board = PriceBoard::new(5);
        let err = board.fresh_quote("DOGEUSDT", Utc::now()).await.unwrap_err();

        let err = unknown_symbol_to_validation("DOGEUSDT", err);
        assert!(matches!(err, DeskError::Validation(_)));
        assert!(err.to_string().contains("DOGEUSDT"));
    }

    #[test]
    fn other_errors_pass_through_unchanged() {
        let err = unknown_symbol_to_validation(
            "BTCUSDT",
            DeskError::StalePrice {
                symbol: "BTCUSDT".to_string(),
                age_secs: 12,
            },
        );
        assert!(matches!(err, DeskError::StalePrice { age_secs: 12, .. }));

        let err = unknown_symbol_to_validation(
            "BTCUSDT",
            DeskError::NotFound {
                kind: "trade",
                id: "abc".to_string(),
            },
        );
        assert!(matches!(err, DeskError::NotFound { kind: "trade", .. }));
    }
}
