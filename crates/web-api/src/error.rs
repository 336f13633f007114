//! HTTP error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use optiondesk_core::error::DeskError;
use serde_json::json;
use tracing::error;

/// Wrapper turning domain errors into JSON error responses.
///
/// Body shape: `{"error": {"kind": "...", "message": "..."}}`. Internal
/// errors are logged server-side and return a generic message.
#[derive(Debug)]
pub struct ApiError(pub DeskError);

impl From<DeskError> for ApiError {
    fn from(err: DeskError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(DeskError::Internal(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DeskError::Validation(_) | DeskError::RedeemRejected(_) => StatusCode::BAD_REQUEST,
            DeskError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DeskError::Forbidden(_) | DeskError::AccountRestricted { .. } => StatusCode::FORBIDDEN,
            DeskError::NotFound { .. } => StatusCode::NOT_FOUND,
            DeskError::InsufficientBalance { .. } | DeskError::TradeNotActive(_) => {
                StatusCode::CONFLICT
            }
            DeskError::StalePrice { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if matches!(self.0, DeskError::Internal(_)) {
            error!(error = ?self.0, "internal error");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({
            "error": {
                "kind": self.0.kind(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Handler result alias.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                ApiError(DeskError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError(DeskError::Unauthorized("no token".into())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError(DeskError::Forbidden("admins only".into())),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError(DeskError::NotFound {
                    kind: "trade",
                    id: "x".into(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError(DeskError::InsufficientBalance {
                    requested: dec!(10),
                    available: dec!(5),
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError(DeskError::StalePrice {
                    symbol: "BTCUSDT".into(),
                    age_secs: 12,
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_error_is_opaque() {
        let err = ApiError(DeskError::Internal(anyhow::anyhow!("pool exhausted")));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
