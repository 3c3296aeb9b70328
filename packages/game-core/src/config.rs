use std::env;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    MissingVariable(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVariable(name) => {
                write!(f, "{} environment variable must be set", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// DynamoDB table names, one per persisted entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub chessboards: String,
    pub games: String,
    pub moves: String,
    pub invites: String,
    pub users: String,
}

impl TableNames {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::MissingVariable(name.to_string()))
        };

        Ok(TableNames {
            chessboards: read("CHESSBOARDS_TABLE")?,
            games: read("GAMES_TABLE")?,
            moves: read("MOVES_TABLE")?,
            invites: read("INVITES_TABLE")?,
            users: read("USERS_TABLE")?,
        })
    }
}
