use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use mb_ledger::LedgerError;
use mb_types::TypeError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("invalid request field: {0}")]
    BadRequest(#[from] TypeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("notice stream error: {0}")]
    Events(#[from] mb_events::EventError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Ledger(e) => ledger_status(e),
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Config(_)
            | ServerError::Events(_)
            | ServerError::Io(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable discriminant for API clients.
    fn kind(&self) -> &'static str {
        match self {
            ServerError::Ledger(e) => match e {
                LedgerError::Unauthorized { .. } => "unauthorized",
                LedgerError::SystemPaused => "system-paused",
                LedgerError::InvalidSignature(_) => "invalid-signature",
                LedgerError::InvalidSampleCount { .. } => "invalid-sample-count",
                LedgerError::SnapshotExists { .. } => "already-exists",
                LedgerError::SettlementInitialized { .. } => "already-initialized",
                LedgerError::SettlementNotInitialized { .. } => "not-initialized",
                LedgerError::RevisionOverflow { .. } => "revision-overflow",
                LedgerError::SnapshotNotFound { .. } | LedgerError::SettlementNotFound { .. } => {
                    "not-found"
                }
                LedgerError::RevisionNotFound { .. } => "revision-not-found",
                LedgerError::Poisoned => "internal",
            },
            ServerError::BadRequest(_) => "bad-request",
            ServerError::Config(_)
            | ServerError::Events(_)
            | ServerError::Io(_)
            | ServerError::Internal(_) => "internal",
        }
    }
}

fn ledger_status(e: &LedgerError) -> StatusCode {
    match e {
        LedgerError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        LedgerError::SystemPaused => StatusCode::SERVICE_UNAVAILABLE,
        LedgerError::InvalidSignature(_) | LedgerError::InvalidSampleCount { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerError::SnapshotExists { .. }
        | LedgerError::SettlementInitialized { .. }
        | LedgerError::SettlementNotInitialized { .. }
        | LedgerError::RevisionOverflow { .. } => StatusCode::CONFLICT,
        LedgerError::SnapshotNotFound { .. }
        | LedgerError::SettlementNotFound { .. }
        | LedgerError::RevisionNotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_types::{AccountId, Role, StationId};

    #[test]
    fn error_status_mapping() {
        let unauthorized = ServerError::Ledger(LedgerError::Unauthorized {
            account: AccountId::from_raw([1; 32]),
            role: Role::Admin,
        });
        assert_eq!(unauthorized.status(), StatusCode::FORBIDDEN);
        assert_eq!(unauthorized.kind(), "unauthorized");

        let paused = ServerError::Ledger(LedgerError::SystemPaused);
        assert_eq!(paused.status(), StatusCode::SERVICE_UNAVAILABLE);

        let exists = ServerError::Ledger(LedgerError::SnapshotExists {
            station: StationId::new("STATION-001").unwrap(),
            date: "2025-01-15".parse().unwrap(),
        });
        assert_eq!(exists.status(), StatusCode::CONFLICT);

        let missing = ServerError::Ledger(LedgerError::SnapshotNotFound {
            station: StationId::new("STATION-001").unwrap(),
            date: "2025-01-15".parse().unwrap(),
        });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.kind(), "not-found");

        let bad_sig = ServerError::Ledger(LedgerError::InvalidSignature("nope".into()));
        assert_eq!(bad_sig.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let poisoned = ServerError::Ledger(LedgerError::Poisoned);
        assert_eq!(poisoned.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn event_errors_are_internal() {
        let err: ServerError = mb_events::EventError::Serialization("bad frame".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn type_errors_are_bad_requests() {
        let err = ServerError::BadRequest(TypeError::InvalidDateKey("2025-1-5".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "bad-request");
    }
}
