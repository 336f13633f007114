//! Settlement audit repository.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SettlementAuditRecord;

const AUDIT_COLUMNS: &str = "trade_id, user_id, natural_outcome, final_outcome, forced, \
     trading_mode, entry_price, exit_price, settled_at";

/// Repository for settlement audit queries.
///
/// Entries are written by the ledger inside the settlement transaction;
/// this repository only reads them back.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets the audit entry for a trade.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_trade(&self, trade_id: Uuid) -> Result<Option<SettlementAuditRecord>> {
        let record = sqlx::query_as::<_, SettlementAuditRecord>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM settlement_audit WHERE trade_id = $1"
        ))
        .bind(trade_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Queries forced settlements, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_forced(&self, limit: i64) -> Result<Vec<SettlementAuditRecord>> {
        let records = sqlx::query_as::<_, SettlementAuditRecord>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM settlement_audit WHERE forced \
             ORDER BY settled_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Queries a user's audit entries, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<SettlementAuditRecord>> {
        let records = sqlx::query_as::<_, SettlementAuditRecord>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM settlement_audit WHERE user_id = $1 \
             ORDER BY settled_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
