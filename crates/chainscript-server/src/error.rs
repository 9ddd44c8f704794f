use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chainscript_ledger::{ContentError, LedgerError};
use chainscript_registry::RegistryError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("story not found: {0}")]
    StoryNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidPassage(#[from] ContentError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<LedgerError> for ServerError {
    fn from(err: LedgerError) -> Self {
        Self::Registry(err.into())
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::StoryNotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::InvalidPassage(_) => StatusCode::BAD_REQUEST,
            Self::Registry(e) => match e {
                RegistryError::StoryNotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::AlreadyExists(_) => StatusCode::CONFLICT,
                RegistryError::Ledger(e) => ledger_status(e),
                RegistryError::Store(_)
                | RegistryError::NotPersisted { .. }
                | RegistryError::LockPoisoned => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn ledger_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::InvalidInput(_)
        | LedgerError::ValidationFailed(_)
        | LedgerError::StaleLinkage { .. }
        | LedgerError::ParentStoryNotFound(_)
        | LedgerError::ParentEntryNotFound { .. } => StatusCode::BAD_REQUEST,
        LedgerError::CorruptEntry { .. }
        | LedgerError::EmptyChain
        | LedgerError::Serialization(_)
        | LedgerError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();
        if status.is_server_error() {
            tracing::error!(%status, %detail, "request failed");
        } else {
            tracing::debug!(%status, %detail, "request rejected");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use chainscript_types::{ContentHash, StoryId};

    use super::*;

    #[test]
    fn statuses() {
        let story = StoryId::new("tale").unwrap();
        assert_eq!(
            ServerError::from(RegistryError::StoryNotFound(story.clone())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(RegistryError::AlreadyExists(story)).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServerError::from(ContentError::TooShort { words: 3, min: 250 }).status_code(),
            StatusCode::BAD_REQUEST
        );
        let stale = LedgerError::StaleLinkage {
            linked: ContentHash::null(),
            tip: ContentHash::null(),
        };
        assert_eq!(
            ServerError::from(RegistryError::from(stale)).status_code(),
            StatusCode::BAD_REQUEST
        );
        let corrupt = LedgerError::CorruptEntry {
            seq: 1,
            stored: ContentHash::null(),
            computed: ContentHash::null(),
        };
        assert_eq!(
            ServerError::from(RegistryError::from(corrupt)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_passage_message_is_the_validation_reason() {
        let err = ServerError::from(ContentError::TooLong { words: 600, max: 500 });
        assert_eq!(
            err.to_string(),
            "passage too long: maximum 500 words allowed, got 600"
        );
    }
}
