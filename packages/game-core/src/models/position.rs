use chess::{Board, BoardStatus, ChessMove, Color, File, Piece, Rank, Square};
use std::str::FromStr;

use crate::models::color::PlayerColor;
use crate::models::outcome::{outcome_from_status, GameMethod, GameOutcome};
use crate::services::errors::chess_service_errors::ChessServiceError;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const FIVEFOLD: usize = 5;
const SEVENTY_FIVE_MOVES_IN_PLIES: u32 = 150;

/// One point in a game: the board plus the counters and history the `chess`
/// crate does not track (halfmove clock, fullmove number, repetitions) and
/// the outcome reached so far.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    // Hashes since the last irreversible move, current position last.
    history: Vec<u64>,
    outcome: GameOutcome,
    method: GameMethod,
}

impl Position {
    pub fn starting() -> Self {
        Self::from_board(Board::default(), 0, 1)
    }

    pub fn from_fen(fen: &str) -> Result<Self, ChessServiceError> {
        let board = Board::from_str(fen)
            .map_err(|e| ChessServiceError::InvalidPosition(format!("Invalid FEN: {}", e)))?;

        let fields: Vec<&str> = fen.split_whitespace().collect();
        let halfmove_clock = parse_counter(fields.get(4), 0)?;
        let fullmove_number = parse_counter(fields.get(5), 1)?;

        Ok(Self::from_board(board, halfmove_clock, fullmove_number))
    }

    fn from_board(board: Board, halfmove_clock: u32, fullmove_number: u32) -> Self {
        let mut position = Position {
            history: vec![board.get_hash()],
            board,
            halfmove_clock,
            fullmove_number,
            outcome: GameOutcome::NoOutcome,
            method: GameMethod::NoMethod,
        };
        (position.outcome, position.method) = position.automatic_outcome();
        position
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> PlayerColor {
        PlayerColor::from(self.board.side_to_move())
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn method(&self) -> GameMethod {
        self.method
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// How many times the current position has occurred.
    pub fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.history.iter().filter(|hash| **hash == current).count()
    }

    pub fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    pub fn fen(&self) -> String {
        let board_fen = self.board.to_string();
        let placement: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Plays an already validated move. `irreversible` is set for pawn moves
    /// and captures, which reset the halfmove clock and repetition history.
    pub(crate) fn advance(&self, chess_move: ChessMove, irreversible: bool) -> Position {
        let board = self.board.make_move_new(chess_move);

        let halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        let fullmove_number = if self.board.side_to_move() == Color::Black {
            self.fullmove_number.saturating_add(1)
        } else {
            self.fullmove_number
        };

        let mut history = if irreversible {
            Vec::new()
        } else {
            self.history.clone()
        };
        history.push(board.get_hash());

        let mut next = Position {
            board,
            halfmove_clock,
            fullmove_number,
            history,
            outcome: GameOutcome::NoOutcome,
            method: GameMethod::NoMethod,
        };
        (next.outcome, next.method) = next.automatic_outcome();
        next
    }

    pub(crate) fn conclude(&mut self, outcome: GameOutcome, method: GameMethod) {
        self.outcome = outcome;
        self.method = method;
    }

    fn automatic_outcome(&self) -> (GameOutcome, GameMethod) {
        let status = self.board.status();
        if status != BoardStatus::Ongoing {
            return outcome_from_status(status, self.board.side_to_move());
        }

        if self.repetitions() >= FIVEFOLD {
            (GameOutcome::Draw, GameMethod::FivefoldRepetition)
        } else if self.halfmove_clock >= SEVENTY_FIVE_MOVES_IN_PLIES {
            (GameOutcome::Draw, GameMethod::SeventyFiveMoveRule)
        } else if insufficient_material(&self.board) {
            (GameOutcome::Draw, GameMethod::InsufficientMaterial)
        } else {
            (GameOutcome::NoOutcome, GameMethod::NoMethod)
        }
    }

    /// 8x8 grid, rank 8 first. White pieces upper case, empty squares `-`.
    pub fn render(&self) -> String {
        (0..8)
            .rev()
            .map(|rank| {
                (0..8)
                    .map(|file| {
                        let square =
                            Square::make_square(Rank::from_index(rank), File::from_index(file));
                        match (self.board.piece_on(square), self.board.color_on(square)) {
                            (Some(piece), Some(color)) => piece_letter(piece, color).to_string(),
                            _ => "-".to_string(),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

fn parse_counter(field: Option<&&str>, default: u32) -> Result<u32, ChessServiceError> {
    match field {
        Some(value) => value.parse().map_err(|_| {
            ChessServiceError::InvalidPosition(format!("Invalid FEN move counter: {}", value))
        }),
        None => Ok(default),
    }
}

fn piece_letter(piece: Piece, color: Color) -> char {
    let letter = match piece {
        Piece::King => 'k',
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        Piece::Pawn => 'p',
    };
    match color {
        Color::White => letter.to_ascii_uppercase(),
        Color::Black => letter,
    }
}

fn insufficient_material(board: &Board) -> bool {
    let mating_material =
        *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if mating_material.popcnt() > 0 {
        return false;
    }

    let knights = board.pieces(Piece::Knight).popcnt();
    let bishops = *board.pieces(Piece::Bishop);
    if knights + bishops.popcnt() <= 1 {
        return true;
    }
    if knights > 0 {
        return false;
    }

    // Bishops only: no mate is possible when they all share a square colour.
    let mut shades =
        bishops.map(|square| (square.get_rank().to_index() + square.get_file().to_index()) % 2);
    match shades.next() {
        Some(first) => shades.all(|shade| shade == first),
        None => true,
    }
}
