use crate::services::errors::service_errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessServiceError {
    Decode(String),
    IllegalMove(String),
    GameOver(String),
    InvalidPosition(String),
    IneligibleDraw(String),
    CorruptHistory(String),
}

impl std::fmt::Display for ChessServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChessServiceError::Decode(msg) => write!(f, "Could not decode move: {}", msg),
            ChessServiceError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            ChessServiceError::GameOver(msg) => write!(f, "Game over: {}", msg),
            ChessServiceError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            ChessServiceError::IneligibleDraw(msg) => write!(f, "Draw not available: {}", msg),
            ChessServiceError::CorruptHistory(msg) => write!(f, "Corrupt move history: {}", msg),
        }
    }
}

impl std::error::Error for ChessServiceError {}

impl From<ChessServiceError> for ServiceError {
    fn from(err: ChessServiceError) -> Self {
        match err {
            ChessServiceError::Decode(_) => ServiceError::InvalidInput("Move UCI".to_string()),
            ChessServiceError::IllegalMove(_) => {
                ServiceError::Forbidden("Move is not valid in current position".to_string())
            }
            ChessServiceError::GameOver(msg) => ServiceError::Conflict(msg),
            ChessServiceError::InvalidPosition(_) => ServiceError::InvalidInput("FEN".to_string()),
            ChessServiceError::IneligibleDraw(msg) => ServiceError::Conflict(msg),
            ChessServiceError::CorruptHistory(msg) => ServiceError::Internal(msg),
        }
    }
}
