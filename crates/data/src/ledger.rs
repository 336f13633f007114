//! Atomic ledger operations.
//!
//! Every balance movement happens here, inside a single database transaction
//! that locks the user row (`SELECT ... FOR UPDATE`) and writes the balance,
//! the originating entity, and the transaction record together. Settlement is
//! idempotent: the trade row is the settlement key, and a guarded update on
//! `status = 'active'` makes a second settlement of the same trade a no-op.

use anyhow::Context;
use chrono::{DateTime, Utc};
use optiondesk_core::error::{DeskError, DeskResult};
use optiondesk_core::settlement::{self, SettlementDecision};
use optiondesk_core::types::{TradeOutcome, TransactionKind};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{SettlementAuditRecord, TradeRecord, TransactionRecord, UserRecord};

/// Result of settling a trade.
#[derive(Debug, Clone)]
pub struct SettledTrade {
    pub trade_id: Uuid,
    pub user_id: Uuid,
    pub decision: SettlementDecision,
    pub exit_price: Decimal,
    /// Signed balance effect applied to the user.
    pub profit: Decimal,
    pub new_balance: Decimal,
}

/// Result of an admin review of a pending transaction.
#[derive(Debug, Clone)]
pub struct ReviewedTransaction {
    pub transaction: TransactionRecord,
    pub approved: bool,
    /// New balance when the review moved funds.
    pub new_balance: Option<Decimal>,
}

/// Result of claiming a redeem code.
#[derive(Debug, Clone)]
pub struct ClaimedCode {
    pub code: String,
    pub amount: Decimal,
    pub new_balance: Decimal,
}

/// Stored balance versus the balance implied by completed transactions.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceDrift {
    pub user_id: Uuid,
    pub username: String,
    pub stored: Decimal,
    pub computed: Decimal,
    pub drift: Decimal,
}

impl BalanceDrift {
    /// Returns true if the stored balance matches the transaction history.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.drift == Decimal::ZERO
    }
}

/// Atomic balance and trade-state mutations over one connection pool.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: PgPool,
}

impl Ledger {
    /// Creates a new ledger over a shared pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a trade after checking account standing and balance under lock.
    ///
    /// The stake stays in the balance until settlement; the check only
    /// ensures the user could cover a full loss of this trade.
    ///
    /// # Errors
    /// Returns `AccountRestricted` for suspended or banned accounts,
    /// `InsufficientBalance` if the stake exceeds the balance, and
    /// `NotFound` for an unknown user.
    pub async fn place_trade(&self, record: &TradeRecord) -> DeskResult<()> {
        let mut tx = self.pool.begin().await.context("begin place_trade")?;

        let user = lock_user(&mut tx, record.user_id).await?;
        if !user.is_active() {
            return Err(DeskError::AccountRestricted {
                user_id: user.id,
                status: user.status,
            });
        }
        if record.stake > user.balance {
            return Err(DeskError::InsufficientBalance {
                requested: record.stake,
                available: user.balance,
            });
        }

        sqlx::query(
            r"
            INSERT INTO trades
                (id, user_id, symbol, direction, stake, duration_secs, entry_price,
                 payout_rate, status, placed_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.symbol)
        .bind(&record.direction)
        .bind(record.stake)
        .bind(record.duration_secs)
        .bind(record.entry_price)
        .bind(record.payout_rate)
        .bind(&record.status)
        .bind(record.placed_at)
        .bind(record.expires_at)
        .execute(&mut *tx)
        .await
        .context("insert trade")?;

        tx.commit().await.context("commit place_trade")?;

        info!(
            trade_id = %record.id,
            user_id = %record.user_id,
            symbol = %record.symbol,
            stake = %record.stake,
            "trade placed"
        );
        Ok(())
    }

    /// Settles a trade at the given exit price.
    ///
    /// The trading mode in effect at settlement time decides the outcome;
    /// the balance update, the trade state change, the transaction record,
    /// and the audit entry all commit or roll back together.
    ///
    /// # Errors
    /// Returns `TradeNotActive` if the trade was already settled or
    /// cancelled, which callers treat as a no-op.
    pub async fn settle_trade(
        &self,
        trade_id: Uuid,
        exit_price: Decimal,
        settled_at: DateTime<Utc>,
    ) -> DeskResult<SettledTrade> {
        let mut tx = self.pool.begin().await.context("begin settle_trade")?;

        let trade = sqlx::query_as::<_, TradeRecord>(
            r"
            SELECT id, user_id, symbol, direction, stake, duration_secs, entry_price,
                   exit_price, payout_rate, status, outcome, profit, placed_at,
                   expires_at, settled_at
            FROM trades
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(trade_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock trade")?
        .ok_or(DeskError::NotFound {
            kind: "trade",
            id: trade_id.to_string(),
        })?;

        if !trade.is_active() {
            return Err(DeskError::TradeNotActive(trade_id));
        }

        let direction = trade
            .parsed_direction()
            .ok_or_else(|| anyhow::anyhow!("trade {trade_id} has bad direction {}", trade.direction))?;

        let user = lock_user(&mut tx, trade.user_id).await?;
        let mode = user.parsed_mode();

        let decision = settlement::decide(direction, trade.entry_price, exit_price, mode);
        let profit = settlement::profit(decision.outcome, trade.stake, trade.payout_rate);

        let updated = sqlx::query(
            r"
            UPDATE trades
            SET status = 'completed', outcome = $2, exit_price = $3, profit = $4, settled_at = $5
            WHERE id = $1 AND status = 'active'
            ",
        )
        .bind(trade_id)
        .bind(decision.outcome.as_str())
        .bind(exit_price)
        .bind(profit)
        .bind(settled_at)
        .execute(&mut *tx)
        .await
        .context("complete trade")?;
        if updated.rows_affected() == 0 {
            return Err(DeskError::TradeNotActive(trade_id));
        }

        let (kind, amount) = match decision.outcome {
            TradeOutcome::Win => (TransactionKind::TradeWin, profit),
            TradeOutcome::Loss => (TransactionKind::TradeLoss, trade.stake),
        };
        let tx_record = TransactionRecord::completed(
            trade.user_id,
            kind,
            amount,
            Some(trade_id.to_string()),
        );
        insert_transaction(&mut tx, &tx_record).await?;

        let audit = SettlementAuditRecord::from_decision(
            trade_id,
            trade.user_id,
            &decision,
            trade.entry_price,
            exit_price,
            settled_at,
        );
        sqlx::query(
            r"
            INSERT INTO settlement_audit
                (trade_id, user_id, natural_outcome, final_outcome, forced,
                 trading_mode, entry_price, exit_price, settled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(audit.trade_id)
        .bind(audit.user_id)
        .bind(&audit.natural_outcome)
        .bind(&audit.final_outcome)
        .bind(audit.forced)
        .bind(&audit.trading_mode)
        .bind(audit.entry_price)
        .bind(audit.exit_price)
        .bind(audit.settled_at)
        .execute(&mut *tx)
        .await
        .context("insert settlement audit")?;

        let new_balance = apply_balance(&mut tx, trade.user_id, profit).await?;

        tx.commit().await.context("commit settle_trade")?;

        if decision.forced {
            warn!(
                trade_id = %trade_id,
                user_id = %trade.user_id,
                mode = mode.as_str(),
                natural = decision.natural.as_str(),
                "settlement outcome forced by trading mode"
            );
        }
        info!(
            trade_id = %trade_id,
            user_id = %trade.user_id,
            outcome = decision.outcome.as_str(),
            profit = %profit,
            "trade settled"
        );

        Ok(SettledTrade {
            trade_id,
            user_id: trade.user_id,
            decision,
            exit_price,
            profit,
            new_balance,
        })
    }

    /// Applies an admin decision to a pending deposit or withdrawal.
    ///
    /// Withdrawal approval re-checks funds under the user row lock; an
    /// insufficient balance leaves the transaction pending and surfaces the
    /// error to the reviewer.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown transaction, `Validation` if it is
    /// not pending or not reviewable, and `InsufficientBalance` when a
    /// withdrawal no longer has cover.
    pub async fn review_transaction(
        &self,
        transaction_id: Uuid,
        approve: bool,
        reviewer_id: Uuid,
    ) -> DeskResult<ReviewedTransaction> {
        let mut tx = self.pool.begin().await.context("begin review")?;

        let mut record = sqlx::query_as::<_, TransactionRecord>(
            r"
            SELECT id, user_id, kind, amount, status, reference, created_at,
                   reviewed_at, reviewed_by
            FROM transactions
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock transaction")?
        .ok_or(DeskError::NotFound {
            kind: "transaction",
            id: transaction_id.to_string(),
        })?;

        if !record.is_pending() {
            return Err(DeskError::Validation(format!(
                "transaction {transaction_id} is {}, not pending",
                record.status
            )));
        }
        let kind = record.parsed_kind().ok_or_else(|| {
            anyhow::anyhow!("transaction {transaction_id} has bad kind {}", record.kind)
        })?;
        if !matches!(kind, TransactionKind::Deposit | TransactionKind::Withdrawal) {
            return Err(DeskError::Validation(format!(
                "transaction kind {} is not reviewable",
                record.kind
            )));
        }

        let reviewed_at = Utc::now();
        let mut new_balance = None;

        if approve {
            let user = lock_user(&mut tx, record.user_id).await?;
            let delta = match kind {
                TransactionKind::Deposit => record.amount,
                TransactionKind::Withdrawal => {
                    if record.amount > user.balance {
                        return Err(DeskError::InsufficientBalance {
                            requested: record.amount,
                            available: user.balance,
                        });
                    }
                    -record.amount
                }
                _ => unreachable!("kind checked above"),
            };
            new_balance = Some(apply_balance(&mut tx, record.user_id, delta).await?);
            record.status = "completed".to_string();
        } else {
            record.status = "rejected".to_string();
        }

        sqlx::query(
            r"
            UPDATE transactions
            SET status = $2, reviewed_at = $3, reviewed_by = $4
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(transaction_id)
        .bind(&record.status)
        .bind(reviewed_at)
        .bind(reviewer_id)
        .execute(&mut *tx)
        .await
        .context("update transaction review")?;

        record.reviewed_at = Some(reviewed_at);
        record.reviewed_by = Some(reviewer_id);

        tx.commit().await.context("commit review")?;

        info!(
            transaction_id = %transaction_id,
            kind = %record.kind,
            approved = approve,
            reviewer = %reviewer_id,
            "transaction reviewed"
        );

        Ok(ReviewedTransaction {
            transaction: record,
            approved: approve,
            new_balance,
        })
    }

    /// Claims a redeem code for a user, crediting the bonus once.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown code and `RedeemRejected` when the
    /// code is disabled, exhausted, or already claimed by this user.
    pub async fn claim_redeem_code(&self, code: &str, user_id: Uuid) -> DeskResult<ClaimedCode> {
        let mut tx = self.pool.begin().await.context("begin claim")?;

        let code_row = sqlx::query_as::<_, crate::models::RedeemCodeRecord>(
            r"
            SELECT code, amount, max_claims, created_by, created_at, disabled
            FROM redeem_codes
            WHERE code = $1
            FOR UPDATE
            ",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await
        .context("lock redeem code")?
        .ok_or(DeskError::NotFound {
            kind: "redeem code",
            id: code.to_string(),
        })?;

        if code_row.disabled {
            return Err(DeskError::RedeemRejected("code is disabled".to_string()));
        }

        let (claims,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM redeem_claims WHERE code = $1")
                .bind(code)
                .fetch_one(&mut *tx)
                .await
                .context("count claims")?;
        if !code_row.has_capacity(claims) {
            return Err(DeskError::RedeemRejected("code is exhausted".to_string()));
        }

        let claimed = sqlx::query(
            r"
            INSERT INTO redeem_claims (code, user_id, claimed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (code, user_id) DO NOTHING
            ",
        )
        .bind(code)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .context("insert claim")?;
        if claimed.rows_affected() == 0 {
            return Err(DeskError::RedeemRejected(
                "code already claimed by this account".to_string(),
            ));
        }

        let user = lock_user(&mut tx, user_id).await?;
        if !user.is_active() {
            return Err(DeskError::AccountRestricted {
                user_id,
                status: user.status,
            });
        }

        let tx_record = TransactionRecord::completed(
            user_id,
            TransactionKind::Bonus,
            code_row.amount,
            Some(code.to_string()),
        );
        insert_transaction(&mut tx, &tx_record).await?;
        let new_balance = apply_balance(&mut tx, user_id, code_row.amount).await?;

        tx.commit().await.context("commit claim")?;

        info!(code, user_id = %user_id, amount = %code_row.amount, "redeem code claimed");

        Ok(ClaimedCode {
            code: code.to_string(),
            amount: code_row.amount,
            new_balance,
        })
    }

    /// Compares a user's stored balance against their completed transactions.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown user.
    pub async fn reconcile(&self, user_id: Uuid) -> DeskResult<BalanceDrift> {
        let row: Option<(String, Decimal)> =
            sqlx::query_as("SELECT username, balance FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("fetch user balance")?;
        let (username, stored) = row.ok_or(DeskError::NotFound {
            kind: "user",
            id: user_id.to_string(),
        })?;

        let computed = self.computed_balance(user_id).await?;

        Ok(BalanceDrift {
            user_id,
            username,
            stored,
            computed,
            drift: stored - computed,
        })
    }

    /// Reconciles every user, returning only accounts that drifted.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn reconcile_all(&self) -> DeskResult<Vec<BalanceDrift>> {
        let users: Vec<(Uuid, String, Decimal)> =
            sqlx::query_as("SELECT id, username, balance FROM users ORDER BY created_at")
                .fetch_all(&self.pool)
                .await
                .context("list users for reconcile")?;

        let mut drifted = Vec::new();
        for (user_id, username, stored) in users {
            let computed = self.computed_balance(user_id).await?;
            let drift = BalanceDrift {
                user_id,
                username,
                stored,
                computed,
                drift: stored - computed,
            };
            if !drift.is_balanced() {
                warn!(
                    user_id = %drift.user_id,
                    stored = %drift.stored,
                    computed = %drift.computed,
                    "balance drift detected"
                );
                drifted.push(drift);
            }
        }
        Ok(drifted)
    }

    /// Resets a user's stored balance to the transaction-implied balance.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown user.
    pub async fn repair_balance(&self, user_id: Uuid) -> DeskResult<BalanceDrift> {
        let mut tx = self.pool.begin().await.context("begin repair")?;

        let user = lock_user(&mut tx, user_id).await?;
        let computed = computed_balance_in(&mut tx, user_id).await?;

        sqlx::query("UPDATE users SET balance = $2 WHERE id = $1")
            .bind(user_id)
            .bind(computed)
            .execute(&mut *tx)
            .await
            .context("repair balance")?;

        tx.commit().await.context("commit repair")?;

        info!(user_id = %user_id, old = %user.balance, new = %computed, "balance repaired");

        Ok(BalanceDrift {
            user_id,
            username: user.username,
            stored: computed,
            computed,
            drift: Decimal::ZERO,
        })
    }

    async fn computed_balance(&self, user_id: Uuid) -> DeskResult<Decimal> {
        let (sum,): (Decimal,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(
                CASE WHEN kind IN ('withdrawal', 'trade_loss') THEN -amount ELSE amount END
            ), 0)
            FROM transactions
            WHERE user_id = $1 AND status = 'completed'
            ",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("compute balance")?;
        Ok(sum)
    }
}

/// Locks and returns a user row for the duration of the transaction.
async fn lock_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> DeskResult<UserRecord> {
    let user = sqlx::query_as::<_, UserRecord>(
        r"
        SELECT id, username, email, password_hash, balance, role, status, trading_mode, created_at
        FROM users
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock user")?
    .ok_or(DeskError::NotFound {
        kind: "user",
        id: user_id.to_string(),
    })?;

    Ok(user)
}

/// Applies a signed delta to the locked user's balance and returns the result.
async fn apply_balance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    delta: Decimal,
) -> DeskResult<Decimal> {
    let (balance,): (Decimal,) = sqlx::query_as(
        "UPDATE users SET balance = balance + $2 WHERE id = $1 RETURNING balance",
    )
    .bind(user_id)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await
    .context("apply balance delta")?;

    Ok(balance)
}

async fn insert_transaction(
    tx: &mut Transaction<'_, Postgres>,
    record: &TransactionRecord,
) -> DeskResult<()> {
    sqlx::query(
        r"
        INSERT INTO transactions
            (id, user_id, kind, amount, status, reference, created_at, reviewed_at, reviewed_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(&record.kind)
    .bind(record.amount)
    .bind(&record.status)
    .bind(&record.reference)
    .bind(record.created_at)
    .bind(record.reviewed_at)
    .bind(record.reviewed_by)
    .execute(&mut **tx)
    .await
    .context("insert transaction")?;

    Ok(())
}

async fn computed_balance_in(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> DeskResult<Decimal> {
    let (sum,): (Decimal,) = sqlx::query_as(
        r"
        SELECT COALESCE(SUM(
            CASE WHEN kind IN ('withdrawal', 'trade_loss') THEN -amount ELSE amount END
        ), 0)
        FROM transactions
        WHERE user_id = $1 AND status = 'completed'
        ",
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await
    .context("compute balance")?;
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn drift_detection() {
        let drift = BalanceDrift {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            stored: dec!(100),
            computed: dec!(100),
            drift: Decimal::ZERO,
        };
        assert!(drift.is_balanced());

        let drift = BalanceDrift {
            user_id: Uuid::new_v4(),
            username: "bob".to_string(),
            stored: dec!(100),
            computed: dec!(85),
            drift: dec!(15),
        };
        assert!(!drift.is_balanced());
    }
}
