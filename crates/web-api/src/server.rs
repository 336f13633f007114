use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, websocket};

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/auth/register", post(handlers::auth::register))
            .route("/api/auth/login", post(handlers::auth::login))
            .route("/api/auth/me", get(handlers::auth::me))
            .route("/api/account/balance", get(handlers::account::balance))
            .route(
                "/api/account/transactions",
                get(handlers::account::transactions),
            )
            .route(
                "/api/account/deposit",
                post(handlers::account::request_deposit),
            )
            .route(
                "/api/account/withdraw",
                post(handlers::account::request_withdrawal),
            )
            .route("/api/account/redeem", post(handlers::account::redeem))
            .route(
                "/api/trades",
                post(handlers::trades::place_trade).get(handlers::trades::list_trades),
            )
            .route("/api/trades/active", get(handlers::trades::active_trades))
            .route("/api/trades/:trade_id", get(handlers::trades::get_trade))
            .route("/api/prices", get(handlers::trades::prices))
            .route("/api/admin/users", get(handlers::admin::list_users))
            .route(
                "/api/admin/users/:user_id/trading-mode",
                put(handlers::admin::set_trading_mode),
            )
            .route(
                "/api/admin/users/:user_id/status",
                put(handlers::admin::set_status),
            )
            .route(
                "/api/admin/users/:user_id/role",
                put(handlers::admin::set_role),
            )
            .route(
                "/api/admin/transactions/pending",
                get(handlers::admin::pending_transactions),
            )
            .route(
                "/api/admin/transactions/:transaction_id/review",
                put(handlers::admin::review_transaction),
            )
            .route(
                "/api/admin/redeem-codes",
                post(handlers::admin::create_redeem_code).get(handlers::admin::list_redeem_codes),
            )
            .route(
                "/api/admin/redeem-codes/:code",
                delete(handlers::admin::disable_redeem_code),
            )
            .route(
                "/api/admin/audit/forced",
                get(handlers::admin::forced_settlements),
            )
            .route(
                "/api/admin/trades/recent",
                get(handlers::admin::recent_trades),
            )
            .route("/api/admin/reconcile", post(handlers::admin::reconcile))
            .route("/ws", get(websocket::websocket_handler))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
