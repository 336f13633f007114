//! REST and WebSocket API for the OptionDesk platform.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod websocket;

pub use auth::AuthService;
pub use error::{ApiError, ApiResult};
pub use server::ApiServer;
pub use state::AppState;
