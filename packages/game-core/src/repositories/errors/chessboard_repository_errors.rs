#[derive(Debug)]
pub enum ChessboardRepositoryError {
    AlreadyExists,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for ChessboardRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChessboardRepositoryError::AlreadyExists => write!(f, "Chessboard already exists"),
            ChessboardRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            ChessboardRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for ChessboardRepositoryError {}
