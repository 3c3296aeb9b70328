use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::color::PlayerColor;
use crate::models::outcome::{GameMethod, GameOutcome};

/// The stored row for one game. The position itself is rebuilt from the move
/// list; `fen`, `turn`, `outcome` and `method` are the snapshot written by the
/// last save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub white_board_id: u64,
    pub black_board_id: u64,
    pub initial_fen: String,
    pub fen: String,
    pub turn: PlayerColor,
    pub outcome: GameOutcome,
    pub method: GameMethod,
    pub offered_draw: GameMethod,
    pub offering_player: PlayerColor,
    pub created_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(white_board_id: u64, black_board_id: u64, initial_fen: &str, turn: PlayerColor) -> Self {
        GameRecord {
            id: Uuid::new_v4().to_string(),
            white_board_id,
            black_board_id,
            initial_fen: initial_fen.to_string(),
            fen: initial_fen.to_string(),
            turn,
            outcome: GameOutcome::NoOutcome,
            method: GameMethod::NoMethod,
            offered_draw: GameMethod::NoMethod,
            offering_player: PlayerColor::White,
            created_at: Utc::now(),
        }
    }
}

/// The columns written by a game save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateUpdate {
    pub fen: String,
    pub turn: PlayerColor,
    pub outcome: GameOutcome,
    pub method: GameMethod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::position::STARTING_FEN;

    #[test]
    fn test_new_game_record_fields() {
        let record = GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White);

        assert_eq!(record.white_board_id, 1);
        assert_eq!(record.black_board_id, 2);
        assert_eq!(record.fen, STARTING_FEN);
        assert_eq!(record.initial_fen, STARTING_FEN);
        assert_eq!(record.outcome, GameOutcome::NoOutcome);
        assert_eq!(record.offered_draw, GameMethod::NoMethod);
        assert_eq!(record.offering_player, PlayerColor::White);

        let now = Utc::now();
        assert!((now - record.created_at).num_seconds() < 10);
    }

    #[test]
    fn test_game_record_id_uniqueness() {
        let record1 = GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White);
        let record2 = GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White);

        assert_ne!(record1.id, record2.id);
    }

    #[test]
    fn test_game_record_serialization() {
        let mut record = GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White);
        record.outcome = GameOutcome::Draw;
        record.method = GameMethod::FiftyMoveRule;

        let serialized = serde_json::to_string(&record).unwrap();
        assert!(serialized.contains("\"outcome\":\"DRAW\""));
        assert!(serialized.contains("\"method\":\"50_MOVES\""));
        assert!(serialized.contains("\"turn\":\"WHITE\""));

        let deserialized: GameRecord = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, record);
    }
}
