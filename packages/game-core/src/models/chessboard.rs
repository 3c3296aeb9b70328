use serde::{Deserialize, Serialize};

/// A registered player slot. `onboard_id` is burned into the physical board
/// and assigned outside this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chessboard {
    pub onboard_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_game_id: Option<String>,
}

impl Chessboard {
    pub fn new(onboard_id: u64) -> Self {
        Chessboard {
            onboard_id,
            owner_id: None,
            current_game_id: None,
        }
    }

    pub fn is_in_game(&self) -> bool {
        self.current_game_id.is_some()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}
