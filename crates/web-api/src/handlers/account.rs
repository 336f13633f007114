//! Balance and wallet endpoints.

use axum::extract::{Query, State};
use axum::Json;
use optiondesk_core::error::DeskError;
use optiondesk_data::models::TransactionRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::Pagination;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub code: String,
    pub amount: Decimal,
    pub balance: Decimal,
}

/// GET /api/account/balance
pub async fn balance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<BalanceResponse>> {
    let user = state
        .repos
        .users
        .get_by_id(auth.user_id)
        .await?
        .ok_or(DeskError::NotFound {
            kind: "user",
            id: auth.user_id.to_string(),
        })?;

    Ok(Json(BalanceResponse {
        balance: user.balance,
    }))
}

/// GET /api/account/transactions
pub async fn transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<TransactionRecord>>> {
    let (limit, offset) = page.clamped();
    let records = state
        .repos
        .transactions
        .query_by_user(auth.user_id, limit, offset)
        .await?;

    Ok(Json(records))
}

/// POST /api/account/deposit
pub async fn request_deposit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AmountRequest>,
) -> ApiResult<Json<TransactionRecord>> {
    let handle = state.registry.handle(auth.user_id).await;
    let record = handle.request_deposit(request.amount).await?;
    Ok(Json(record))
}

/// POST /api/account/withdraw
pub async fn request_withdrawal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AmountRequest>,
) -> ApiResult<Json<TransactionRecord>> {
    let handle = state.registry.handle(auth.user_id).await;
    let record = handle.request_withdrawal(request.amount).await?;
    Ok(Json(record))
}

/// POST /api/account/redeem
pub async fn redeem(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<RedeemRequest>,
) -> ApiResult<Json<RedeemResponse>> {
    let handle = state.registry.handle(auth.user_id).await;
    let claimed = handle.claim_redeem_code(request.code).await?;

    Ok(Json(RedeemResponse {
        code: claimed.code,
        amount: claimed.amount,
        balance: claimed.new_balance,
    }))
}
