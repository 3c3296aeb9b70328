use chess::{ChessMove, MoveGen, Piece, Square};
use std::str::FromStr;

use crate::{
    models::{
        color::PlayerColor,
        moves::{MoveRecord, MoveTag, PieceKind, PlayedMove},
        outcome::{GameMethod, GameOutcome},
        position::Position,
    },
    services::errors::chess_service_errors::ChessServiceError,
};

const THREEFOLD: usize = 3;
const FIFTY_MOVES_IN_PLIES: u32 = 100;

/// Rules engine used by game sessions. Pure and synchronous; every call takes
/// a position and returns a new one.
#[derive(Clone, Default)]
pub struct ChessService;

impl ChessService {
    pub fn new() -> Self {
        ChessService
    }

    pub fn new_game(&self) -> Position {
        Position::starting()
    }

    /// Starts from a caller supplied FEN. Positions that are already decided
    /// are refused so a fresh game never begins terminal.
    pub fn new_game_from_position(&self, fen: &str) -> Result<Position, ChessServiceError> {
        let position = Position::from_fen(fen)?;
        if position.outcome().is_terminal() {
            return Err(ChessServiceError::InvalidPosition(format!(
                "Position is already decided by {}",
                position.method()
            )));
        }
        Ok(position)
    }

    /// Decode a UCI token, validate it against the position and play it.
    pub fn apply_move(
        &self,
        position: &Position,
        token: &str,
    ) -> Result<(Position, PlayedMove), ChessServiceError> {
        if position.outcome().is_terminal() {
            return Err(ChessServiceError::GameOver(
                "Game is already over".to_string(),
            ));
        }

        let chess_move = decode_uci(token)?;
        let board = position.board();

        // Validate the move by checking if it's in legal moves
        if !MoveGen::new_legal(board).any(|legal| legal == chess_move) {
            return Err(ChessServiceError::IllegalMove(format!(
                "{} is not legal",
                chess_move
            )));
        }

        let source = chess_move.get_source();
        let dest = chess_move.get_dest();
        let piece = board.piece_on(source).ok_or_else(|| {
            ChessServiceError::IllegalMove(format!("No piece on {}", source))
        })?;
        let captured = board.piece_on(dest).is_some();
        // A pawn changing file onto an empty square can only be en passant.
        let en_passant = piece == Piece::Pawn && source.get_file() != dest.get_file() && !captured;

        let mut tags = Vec::new();
        if captured || en_passant {
            tags.push(MoveTag::Capture);
        }
        if en_passant {
            tags.push(MoveTag::EnPassant);
        }
        if piece == Piece::King {
            let from = source.get_file().to_index();
            let to = dest.get_file().to_index();
            if to == from + 2 {
                tags.push(MoveTag::KingSideCastle);
            } else if from == to + 2 {
                tags.push(MoveTag::QueenSideCastle);
            }
        }

        let next = position.advance(chess_move, piece == Piece::Pawn || captured);
        if next.in_check() {
            tags.push(MoveTag::Check);
        }

        let played = PlayedMove {
            player: position.turn(),
            cell_from: source.to_string(),
            cell_to: dest.to_string(),
            piece: PieceKind::from(piece),
            promotion: chess_move.get_promotion().map(PieceKind::from),
            tags,
        };

        Ok((next, played))
    }

    pub fn turn_of(&self, position: &Position) -> PlayerColor {
        position.turn()
    }

    pub fn outcome(&self, position: &Position) -> (GameOutcome, GameMethod) {
        (position.outcome(), position.method())
    }

    /// Draw bases a player may currently propose. The plain offer is always
    /// available while the game is running.
    pub fn eligible_draw_methods(&self, position: &Position) -> Vec<GameMethod> {
        if position.outcome().is_terminal() {
            return Vec::new();
        }

        let mut methods = vec![GameMethod::DrawOffer];
        if position.repetitions() >= THREEFOLD {
            methods.push(GameMethod::ThreefoldRepetition);
        }
        if position.halfmove_clock() >= FIFTY_MOVES_IN_PLIES {
            methods.push(GameMethod::FiftyMoveRule);
        }
        methods
    }

    /// Legal moves in UCI notation. Empty once the game is over.
    pub fn legal_moves(&self, position: &Position) -> Vec<String> {
        if position.outcome().is_terminal() {
            return Vec::new();
        }
        MoveGen::new_legal(position.board())
            .map(|m| m.to_string())
            .collect()
    }

    pub fn to_fen(&self, position: &Position) -> String {
        position.fen()
    }

    pub fn resign(
        &self,
        position: &Position,
        losing: PlayerColor,
    ) -> Result<Position, ChessServiceError> {
        if position.outcome().is_terminal() {
            return Err(ChessServiceError::GameOver(
                "Game is already over".to_string(),
            ));
        }

        let mut next = position.clone();
        next.conclude(GameOutcome::win_for(losing.other()), GameMethod::Resignation);
        Ok(next)
    }

    pub fn apply_draw(
        &self,
        position: &Position,
        method: GameMethod,
    ) -> Result<Position, ChessServiceError> {
        if position.outcome().is_terminal() {
            return Err(ChessServiceError::GameOver(
                "Game is already over".to_string(),
            ));
        }
        if !self.eligible_draw_methods(position).contains(&method) {
            return Err(ChessServiceError::IneligibleDraw(format!(
                "{} is not available in this position",
                method
            )));
        }

        let mut next = position.clone();
        next.conclude(GameOutcome::Draw, method);
        Ok(next)
    }

    /// Rebuilds a position by playing `moves` in order from `initial_fen`.
    pub fn replay(
        &self,
        initial_fen: &str,
        moves: &[MoveRecord],
    ) -> Result<Position, ChessServiceError> {
        let mut position = Position::from_fen(initial_fen)
            .map_err(|e| ChessServiceError::CorruptHistory(e.to_string()))?;

        for record in moves {
            let (next, _) = self.apply_move(&position, &record.uci()).map_err(|e| {
                ChessServiceError::CorruptHistory(format!("move {}: {}", record.move_num, e))
            })?;
            position = next;
        }

        Ok(position)
    }
}

fn decode_uci(token: &str) -> Result<ChessMove, ChessServiceError> {
    let token = token.trim().to_ascii_lowercase();
    if !token.is_ascii() || !(4..=5).contains(&token.len()) {
        return Err(ChessServiceError::Decode(token));
    }

    let from = Square::from_str(&token[0..2])
        .map_err(|_| ChessServiceError::Decode(format!("Invalid from square in {}", token)))?;
    let to = Square::from_str(&token[2..4])
        .map_err(|_| ChessServiceError::Decode(format!("Invalid to square in {}", token)))?;

    let promotion = match token.get(4..) {
        None | Some("") => None,
        Some("q") => Some(Piece::Queen),
        Some("r") => Some(Piece::Rook),
        Some("b") => Some(Piece::Bishop),
        Some("n") => Some(Piece::Knight),
        Some(other) => {
            return Err(ChessServiceError::Decode(format!(
                "Invalid promotion piece {}",
                other
            )))
        }
    };

    Ok(ChessMove::new(from, to, promotion))
}
