//! Trade endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use optiondesk_core::error::DeskError;
use optiondesk_core::types::TradeDirection;
use optiondesk_data::models::TradeRecord;
use optiondesk_engine::{PlaceTradeRequest, PriceQuote};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::Pagination;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewTradeRequest {
    pub symbol: String,
    pub direction: String,
    pub stake: Decimal,
    pub duration_secs: i64,
}

/// POST /api/trades
pub async fn place_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<NewTradeRequest>,
) -> ApiResult<Json<TradeRecord>> {
    let direction = TradeDirection::parse(&request.direction).ok_or_else(|| {
        DeskError::Validation(format!("unknown direction '{}'", request.direction))
    })?;

    let handle = state.registry.handle(auth.user_id).await;
    let trade = handle
        .place_trade(PlaceTradeRequest {
            symbol: request.symbol,
            direction,
            stake: request.stake,
            duration_secs: request.duration_secs,
        })
        .await?;

    Ok(Json(trade))
}

/// GET /api/trades
pub async fn list_trades(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<TradeRecord>>> {
    let (limit, offset) = page.clamped();
    let trades = state
        .repos
        .trades
        .query_by_user(auth.user_id, limit, offset)
        .await?;

    Ok(Json(trades))
}

/// GET /api/trades/active
pub async fn active_trades(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<TradeRecord>>> {
    let trades = state.repos.trades.query_active_by_user(auth.user_id).await?;
    Ok(Json(trades))
}

/// GET /api/trades/:id
pub async fn get_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(trade_id): Path<Uuid>,
) -> ApiResult<Json<TradeRecord>> {
    let trade = state
        .repos
        .trades
        .get_by_id(trade_id)
        .await?
        .ok_or(DeskError::NotFound {
            kind: "trade",
            id: trade_id.to_string(),
        })?;

    if trade.user_id != auth.user_id && !auth.role.is_admin() {
        // Hide other users' trades rather than confirming they exist.
        return Err(DeskError::NotFound {
            kind: "trade",
            id: trade_id.to_string(),
        }
        .into());
    }

    Ok(Json(trade))
}

/// GET /api/prices
pub async fn prices(State(state): State<AppState>) -> ApiResult<Json<Vec<PriceQuote>>> {
    let mut quotes = Vec::new();
    for symbol in state.board.symbols().await {
        if let Some(quote) = state.board.quote(&symbol).await {
            quotes.push(quote);
        }
    }
    quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(Json(quotes))
}
