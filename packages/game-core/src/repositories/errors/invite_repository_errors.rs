#[derive(Debug)]
pub enum InviteRepositoryError {
    AlreadyExists,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for InviteRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InviteRepositoryError::AlreadyExists => write!(f, "Invite already exists"),
            InviteRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            InviteRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for InviteRepositoryError {}
