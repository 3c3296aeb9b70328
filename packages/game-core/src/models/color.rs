use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::services::errors::service_errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn other(self) -> Self {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }

    /// Storage encoding, also used in responses.
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::White => "WHITE",
            PlayerColor::Black => "BLACK",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerColor {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WHITE" => Ok(PlayerColor::White),
            "BLACK" => Ok(PlayerColor::Black),
            _ => Err(ServiceError::InvalidInput(format!("player color {}", s))),
        }
    }
}

impl From<chess::Color> for PlayerColor {
    fn from(color: chess::Color) -> Self {
        match color {
            chess::Color::White => PlayerColor::White,
            chess::Color::Black => PlayerColor::Black,
        }
    }
}
