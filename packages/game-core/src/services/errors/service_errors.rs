use crate::repositories::errors::chessboard_repository_errors::ChessboardRepositoryError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::invite_repository_errors::InviteRepositoryError;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;

/// Error kinds surfaced by every game-core operation.
///
/// `NotFound` and `AlreadyExists` carry the name of the entity, the other
/// variants carry a human readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    NotFound(String),
    AlreadyExists(String),
    Conflict(String),
    Forbidden(String),
    InvalidInput(String),
    Internal(String),
}

impl ServiceError {
    /// Internal errors may leak storage details and must not reach callers verbatim.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, ServiceError::Internal(_))
    }

    pub fn public_message(&self) -> String {
        if self.is_sensitive() {
            "Internal error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(entity) => write!(f, "{} does not exist", entity),
            ServiceError::AlreadyExists(entity) => write!(f, "{} already exists", entity),
            ServiceError::InvalidInput(what) => write!(f, "{} is malformed", what),
            ServiceError::Conflict(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

// Storage failures are internal unless the call site maps them first.
impl From<ChessboardRepositoryError> for ServiceError {
    fn from(err: ChessboardRepositoryError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<GameRepositoryError> for ServiceError {
    fn from(err: GameRepositoryError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<InviteRepositoryError> for ServiceError {
    fn from(err: InviteRepositoryError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<UserRepositoryError> for ServiceError {
    fn from(err: UserRepositoryError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
