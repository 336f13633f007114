//! WebSocket hub.
//!
//! One socket task per connection, subscribed to the shared engine event
//! channel. Balance-bearing events are delivered only to the owning user's
//! sessions and to authenticated admin dashboards; price ticks are public.

use std::collections::HashSet;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use optiondesk_engine::DeskEvent;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::user_from_claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ClientMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct SubscribePrices {
    symbols: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SubscribeAuthed {
    token: String,
}

/// What one connection has asked to receive.
#[derive(Debug, Default)]
struct Session {
    prices: bool,
    symbols: Option<HashSet<String>>,
    user_id: Option<Uuid>,
    admin: bool,
}

impl Session {
    fn wants_price(&self, symbol: &str) -> bool {
        self.prices
            && self
                .symbols
                .as_ref()
                .map_or(true, |set| set.contains(symbol))
    }

    fn wants_user_event(&self, owner: Uuid) -> bool {
        self.admin || self.user_id == Some(owner)
    }
}

fn envelope(kind: &str, data: Value) -> String {
    json!({
        "type": kind,
        "data": data,
        "timestamp": Utc::now().to_rfc3339(),
    })
    .to_string()
}

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| websocket_connection(socket, state))
}

async fn websocket_connection(mut socket: WebSocket, state: AppState) {
    let mut events = state.registry.subscribe();
    let mut session = Session::default();

    let hello = envelope("connection_established", json!({}));
    if socket.send(Message::Text(hello)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if let Some(text) = render_event(&session, &event) {
                            if socket.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "websocket session lagged behind event stream");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_client_message(&state, &mut session, &text) {
                            if socket.send(Message::Text(reply)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    info!("websocket connection closed");
}

/// Applies a client message to the session; returns an optional reply.
fn handle_client_message(state: &AppState, session: &mut Session, text: &str) -> Option<String> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            return Some(envelope("error", json!({ "message": format!("bad message: {e}") })));
        }
    };

    match message.kind.as_str() {
        "subscribe" => {
            let request: SubscribePrices = serde_json::from_value(message.data).unwrap_or(
                SubscribePrices { symbols: None },
            );
            session.prices = true;
            session.symbols = request.symbols.map(|s| s.into_iter().collect());
            debug!(symbols = ?session.symbols, "price subscription");
            None
        }
        "subscribe_user_balance" => match authenticate(state, &message.data) {
            Ok((user_id, _)) => {
                session.user_id = Some(user_id);
                debug!(user_id = %user_id, "user balance subscription");
                None
            }
            Err(reason) => Some(envelope("error", json!({ "message": reason }))),
        },
        "subscribe_admin_dashboard" => match authenticate(state, &message.data) {
            Ok((user_id, true)) => {
                session.admin = true;
                info!(admin_id = %user_id, "admin dashboard subscription");
                None
            }
            Ok((_, false)) => Some(envelope(
                "error",
                json!({ "message": "admin role required" }),
            )),
            Err(reason) => Some(envelope("error", json!({ "message": reason }))),
        },
        other => Some(envelope(
            "error",
            json!({ "message": format!("unknown message type '{other}'") }),
        )),
    }
}

/// Verifies the token in a subscription payload.
fn authenticate(state: &AppState, data: &Value) -> Result<(Uuid, bool), String> {
    let request: SubscribeAuthed =
        serde_json::from_value(data.clone()).map_err(|_| "token required".to_string())?;
    let claims = state
        .auth
        .verify_token(&request.token)
        .map_err(|e| e.to_string())?;
    let user = user_from_claims(&claims).map_err(|e| e.to_string())?;
    Ok((user.user_id, user.role.is_admin()))
}

/// Renders an event for this session, or `None` if it is not subscribed.
fn render_event(session: &Session, event: &DeskEvent) -> Option<String> {
    match event {
        DeskEvent::PriceTick(quote) => {
            if !session.wants_price(&quote.symbol) {
                return None;
            }
            Some(envelope(
                "price_tick",
                json!({
                    "symbol": quote.symbol,
                    "price": quote.price,
                    "timestamp": quote.timestamp.to_rfc3339(),
                }),
            ))
        }
        DeskEvent::BalanceUpdate { user_id, balance } => {
            if !session.wants_user_event(*user_id) {
                return None;
            }
            Some(envelope(
                "balance_update",
                json!({ "user_id": user_id, "balance": balance }),
            ))
        }
        DeskEvent::TradeOpened {
            user_id,
            trade_id,
            symbol,
            stake,
        } => {
            if !session.wants_user_event(*user_id) {
                return None;
            }
            Some(envelope(
                "trade_opened",
                json!({
                    "user_id": user_id,
                    "trade_id": trade_id,
                    "symbol": symbol,
                    "stake": stake,
                }),
            ))
        }
        DeskEvent::TradeCompleted {
            user_id,
            trade_id,
            outcome,
            profit,
            exit_price,
            new_balance,
        } => {
            if !session.wants_user_event(*user_id) {
                return None;
            }
            Some(envelope(
                "trade_completed",
                json!({
                    "user_id": user_id,
                    "trade_id": trade_id,
                    "outcome": outcome,
                    "profit": profit,
                    "exit_price": exit_price,
                    "balance": new_balance,
                }),
            ))
        }
        DeskEvent::TransactionReviewed {
            user_id,
            transaction_id,
            kind,
            status,
            new_balance,
        } => {
            if !session.wants_user_event(*user_id) {
                return None;
            }
            Some(envelope(
                "transaction_reviewed",
                json!({
                    "user_id": user_id,
                    "transaction_id": transaction_id,
                    "kind": kind,
                    "status": status,
                    "balance": new_balance,
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiondesk_engine::PriceQuote;
    use rust_decimal_macros::dec;

    fn tick(symbol: &str) -> DeskEvent {
        DeskEvent::PriceTick(PriceQuote {
            symbol: symbol.to_string(),
            price: dec!(50000),
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn unsubscribed_session_gets_nothing() {
        let session = Session::default();
        assert!(render_event(&session, &tick("BTCUSDT")).is_none());

        let update = DeskEvent::BalanceUpdate {
            user_id: Uuid::new_v4(),
            balance: dec!(10),
        };
        assert!(render_event(&session, &update).is_none());
    }

    #[test]
    fn price_subscription_filters_by_symbol() {
        let session = Session {
            prices: true,
            symbols: Some(["BTCUSDT".to_string()].into_iter().collect()),
            ..Session::default()
        };

        assert!(render_event(&session, &tick("BTCUSDT")).is_some());
        assert!(render_event(&session, &tick("ETHUSDT")).is_none());

        let all = Session {
            prices: true,
            ..Session::default()
        };
        assert!(render_event(&all, &tick("ETHUSDT")).is_some());
    }

    #[test]
    fn balance_events_go_to_owner_and_admin_only() {
        let owner = Uuid::new_v4();
        let update = DeskEvent::BalanceUpdate {
            user_id: owner,
            balance: dec!(85),
        };

        let owner_session = Session {
            user_id: Some(owner),
            ..Session::default()
        };
        let other_session = Session {
            user_id: Some(Uuid::new_v4()),
            ..Session::default()
        };
        let admin_session = Session {
            admin: true,
            ..Session::default()
        };

        assert!(render_event(&owner_session, &update).is_some());
        assert!(render_event(&other_session, &update).is_none());
        assert!(render_event(&admin_session, &update).is_some());
    }

    #[test]
    fn envelope_shape() {
        let text = envelope("price_tick", json!({ "symbol": "BTCUSDT" }));
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["type"], "price_tick");
        assert_eq!(value["data"]["symbol"], "BTCUSDT");
        assert!(value["timestamp"].is_string());
    }
}
