//! Admin endpoints.
//!
//! All handlers here extract [`AdminUser`]; role changes additionally
//! require the super-admin role.

use axum::extract::{Path, Query, State};
use axum::Json;
use optiondesk_core::error::DeskError;
use optiondesk_core::types::{TradingMode, UserRole, UserStatus};
use optiondesk_data::ledger::BalanceDrift;
use optiondesk_data::models::{
    RedeemCodeRecord, SettlementAuditRecord, TradeRecord, TransactionRecord,
};
use optiondesk_engine::DeskEvent;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::handlers::{AdminUserView, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TradingModeRequest {
    pub mode: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub approve: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewRedeemCodeRequest {
    pub code: String,
    pub amount: Decimal,
    pub max_claims: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub transaction: TransactionRecord,
    pub approved: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn clamped(self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 500)
    }
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<AdminUserView>>> {
    let (limit, offset) = page.clamped();
    let users = state.repos.users.list(limit, offset).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// PUT /api/admin/users/:id/trading-mode
pub async fn set_trading_mode(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<TradingModeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mode = TradingMode::parse(&request.mode)
        .ok_or_else(|| DeskError::Validation(format!("unknown trading mode '{}'", request.mode)))?;

    let updated = state
        .repos
        .users
        .set_trading_mode(user_id, mode.as_str())
        .await?;
    if updated == 0 {
        return Err(DeskError::NotFound {
            kind: "user",
            id: user_id.to_string(),
        }
        .into());
    }

    warn!(
        admin_id = %admin.0.user_id,
        user_id = %user_id,
        mode = mode.as_str(),
        "trading mode changed"
    );
    Ok(Json(serde_json::json!({ "user_id": user_id, "trading_mode": mode.as_str() })))
}

/// PUT /api/admin/users/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let status = UserStatus::parse(&request.status)
        .ok_or_else(|| DeskError::Validation(format!("unknown status '{}'", request.status)))?;

    let updated = state.repos.users.set_status(user_id, status.as_str()).await?;
    if updated == 0 {
        return Err(DeskError::NotFound {
            kind: "user",
            id: user_id.to_string(),
        }
        .into());
    }

    warn!(
        admin_id = %admin.0.user_id,
        user_id = %user_id,
        status = status.as_str(),
        "account status changed"
    );
    Ok(Json(serde_json::json!({ "user_id": user_id, "status": status.as_str() })))
}

/// PUT /api/admin/users/:id/role
pub async fn set_role(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if admin.0.role != UserRole::SuperAdmin {
        return Err(DeskError::Forbidden("super-admin role required".to_string()).into());
    }

    let role = UserRole::parse(&request.role)
        .ok_or_else(|| DeskError::Validation(format!("unknown role '{}'", request.role)))?;

    let updated = state.repos.users.set_role(user_id, role.as_str()).await?;
    if updated == 0 {
        return Err(DeskError::NotFound {
            kind: "user",
            id: user_id.to_string(),
        }
        .into());
    }

    warn!(
        admin_id = %admin.0.user_id,
        user_id = %user_id,
        role = role.as_str(),
        "role changed"
    );
    Ok(Json(serde_json::json!({ "user_id": user_id, "role": role.as_str() })))
}

/// GET /api/admin/transactions/pending
pub async fn pending_transactions(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(limit): Query<LimitQuery>,
) -> ApiResult<Json<Vec<TransactionRecord>>> {
    let records = state.repos.transactions.query_pending(limit.clamped()).await?;
    Ok(Json(records))
}

/// PUT /api/admin/transactions/:id/review
pub async fn review_transaction(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    let reviewed = state
        .ledger
        .review_transaction(transaction_id, request.approve, admin.0.user_id)
        .await?;

    let events = state.registry.event_sender();
    let _ = events.send(DeskEvent::TransactionReviewed {
        user_id: reviewed.transaction.user_id,
        transaction_id,
        kind: reviewed.transaction.kind.clone(),
        status: reviewed.transaction.status.clone(),
        new_balance: reviewed.new_balance,
    });
    if let Some(balance) = reviewed.new_balance {
        let _ = events.send(DeskEvent::BalanceUpdate {
            user_id: reviewed.transaction.user_id,
            balance,
        });
    }

    Ok(Json(ReviewResponse {
        transaction: reviewed.transaction,
        approved: reviewed.approved,
    }))
}

/// POST /api/admin/redeem-codes
pub async fn create_redeem_code(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<NewRedeemCodeRequest>,
) -> ApiResult<Json<RedeemCodeRecord>> {
    if request.code.is_empty() || request.code.len() > 64 {
        return Err(
            DeskError::Validation("code must be 1 to 64 characters".to_string()).into(),
        );
    }
    if request.amount <= Decimal::ZERO {
        return Err(DeskError::Validation("amount must be positive".to_string()).into());
    }
    if matches!(request.max_claims, Some(n) if n <= 0) {
        return Err(DeskError::Validation("max_claims must be positive".to_string()).into());
    }

    let record = RedeemCodeRecord::new(
        request.code,
        request.amount,
        request.max_claims,
        admin.0.user_id,
    );
    state.repos.redeem_codes.insert(&record).await?;

    Ok(Json(record))
}

/// GET /api/admin/redeem-codes
pub async fn list_redeem_codes(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<RedeemCodeRecord>>> {
    let records = state.repos.redeem_codes.list().await?;
    Ok(Json(records))
}

/// DELETE /api/admin/redeem-codes/:code
pub async fn disable_redeem_code(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(code): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = state.repos.redeem_codes.disable(&code).await?;
    if updated == 0 {
        return Err(DeskError::NotFound {
            kind: "redeem code",
            id: code,
        }
        .into());
    }

    warn!(admin_id = %admin.0.user_id, code, "redeem code disabled");
    Ok(Json(serde_json::json!({ "code": code, "disabled": true })))
}

/// GET /api/admin/audit/forced
pub async fn forced_settlements(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(limit): Query<LimitQuery>,
) -> ApiResult<Json<Vec<SettlementAuditRecord>>> {
    let records = state.repos.audits.query_forced(limit.clamped()).await?;
    Ok(Json(records))
}

/// GET /api/admin/trades/recent
pub async fn recent_trades(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(limit): Query<LimitQuery>,
) -> ApiResult<Json<Vec<TradeRecord>>> {
    let records = state.repos.trades.query_recent(limit.clamped()).await?;
    Ok(Json(records))
}

/// POST /api/admin/reconcile
pub async fn reconcile(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<BalanceDrift>>> {
    let drifted = state.ledger.reconcile_all().await?;
    Ok(Json(drifted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_query_clamps() {
        assert_eq!(LimitQuery { limit: None }.clamped(), 50);
        assert_eq!(LimitQuery { limit: Some(0) }.clamped(), 1);
        assert_eq!(LimitQuery { limit: Some(9999) }.clamped(), 500);
    }
}
