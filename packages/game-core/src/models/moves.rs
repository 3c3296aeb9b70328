use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::color::PlayerColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PieceKind::King => "KING",
            PieceKind::Queen => "QUEEN",
            PieceKind::Rook => "ROOK",
            PieceKind::Bishop => "BISHOP",
            PieceKind::Knight => "KNIGHT",
            PieceKind::Pawn => "PAWN",
        }
    }

    /// Letter used for promotions in UCI notation.
    pub fn uci_char(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<chess::Piece> for PieceKind {
    fn from(piece: chess::Piece) -> Self {
        match piece {
            chess::Piece::King => PieceKind::King,
            chess::Piece::Queen => PieceKind::Queen,
            chess::Piece::Rook => PieceKind::Rook,
            chess::Piece::Bishop => PieceKind::Bishop,
            chess::Piece::Knight => PieceKind::Knight,
            chess::Piece::Pawn => PieceKind::Pawn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveTag {
    Capture,
    EnPassant,
    KingSideCastle,
    QueenSideCastle,
    Check,
}

/// A move as decoded and applied by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub player: PlayerColor,
    pub cell_from: String,
    pub cell_to: String,
    pub piece: PieceKind,
    pub promotion: Option<PieceKind>,
    pub tags: Vec<MoveTag>,
}

/// One persisted ply. `move_num` starts at 1 and orders the game's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub game_id: String,
    pub move_num: u32,
    pub player: PlayerColor,
    pub cell_from: String,
    pub cell_to: String,
    pub piece: PieceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
    #[serde(default)]
    pub tags: Vec<MoveTag>,
}

impl MoveRecord {
    pub fn new(game_id: &str, move_num: u32, played: PlayedMove) -> Self {
        MoveRecord {
            game_id: game_id.to_string(),
            move_num,
            player: played.player,
            cell_from: played.cell_from,
            cell_to: played.cell_to,
            piece: played.piece,
            promotion: played.promotion,
            tags: played.tags,
        }
    }

    pub fn uci(&self) -> String {
        match self.promotion {
            Some(piece) => format!("{}{}{}", self.cell_from, self.cell_to, piece.uci_char()),
            None => format!("{}{}", self.cell_from, self.cell_to),
        }
    }

    pub fn has_tag(&self, tag: MoveTag) -> bool {
        self.tags.contains(&tag)
    }
}
