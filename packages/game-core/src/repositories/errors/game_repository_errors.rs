#[derive(Debug)]
pub enum GameRepositoryError {
    /// A row with the same key was written first, e.g. a concurrent move.
    AlreadyExists,
    Serialization(String),
    DynamoDb(String),
    TransactionError(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::AlreadyExists => write!(f, "Record already exists"),
            GameRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            GameRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
            GameRepositoryError::TransactionError(msg) => write!(f, "Transaction error: {}", msg),
        }
    }
}

impl std::error::Error for GameRepositoryError {}
