use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chainritual_common::api::ErrorResponse;
use chainritual_common::wallet_backend::WalletError;

/// Everything a route handler can fail with. Rendered as `{ "error": … }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request is missing fields or carries malformed ones. No backend call was made.
    #[error("{0}")]
    BadRequest(String),
    /// Balance lookups without a chain id are reported like backend failures.
    #[error("chainId not provided")]
    MissingChainId,
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingChainId | ApiError::Wallet(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Text for the `error` field. Wallet failures carry the CLI's own
    /// message, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Wallet(e) => e.diagnostic().to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
