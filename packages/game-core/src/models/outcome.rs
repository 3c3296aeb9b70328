use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::color::PlayerColor;
use crate::services::errors::service_errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameOutcome {
    #[default]
    #[serde(rename = "NONE")]
    NoOutcome,
    #[serde(rename = "WHITE_WON")]
    WhiteWon,
    #[serde(rename = "BLACK_WON")]
    BlackWon,
    #[serde(rename = "DRAW")]
    Draw,
}

impl GameOutcome {
    #[cfg(test)]
    const ALL: [GameOutcome; 4] = [
        GameOutcome::NoOutcome,
        GameOutcome::WhiteWon,
        GameOutcome::BlackWon,
        GameOutcome::Draw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameOutcome::NoOutcome => "NONE",
            GameOutcome::WhiteWon => "WHITE_WON",
            GameOutcome::BlackWon => "BLACK_WON",
            GameOutcome::Draw => "DRAW",
        }
    }

    /// The outcome in which `color` has won.
    pub fn win_for(color: PlayerColor) -> Self {
        match color {
            PlayerColor::White => GameOutcome::WhiteWon,
            PlayerColor::Black => GameOutcome::BlackWon,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != GameOutcome::NoOutcome
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameMethod {
    #[default]
    #[serde(rename = "NONE")]
    NoMethod,
    #[serde(rename = "CHECKMATE")]
    Checkmate,
    #[serde(rename = "RESIGNATION")]
    Resignation,
    #[serde(rename = "DRAW_AGREEMENT")]
    DrawOffer,
    #[serde(rename = "STALEMATE")]
    Stalemate,
    #[serde(rename = "THREEFOLD_REPETITION")]
    ThreefoldRepetition,
    #[serde(rename = "FIVEFOLD_REPETITION")]
    FivefoldRepetition,
    #[serde(rename = "50_MOVES")]
    FiftyMoveRule,
    #[serde(rename = "75_MOVES")]
    SeventyFiveMoveRule,
    #[serde(rename = "INSUFFICIENT_MATERIAL")]
    InsufficientMaterial,
}

impl GameMethod {
    #[cfg(test)]
    const ALL: [GameMethod; 10] = [
        GameMethod::NoMethod,
        GameMethod::Checkmate,
        GameMethod::Resignation,
        GameMethod::DrawOffer,
        GameMethod::Stalemate,
        GameMethod::ThreefoldRepetition,
        GameMethod::FivefoldRepetition,
        GameMethod::FiftyMoveRule,
        GameMethod::SeventyFiveMoveRule,
        GameMethod::InsufficientMaterial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameMethod::NoMethod => "NONE",
            GameMethod::Checkmate => "CHECKMATE",
            GameMethod::Resignation => "RESIGNATION",
            GameMethod::DrawOffer => "DRAW_AGREEMENT",
            GameMethod::Stalemate => "STALEMATE",
            GameMethod::ThreefoldRepetition => "THREEFOLD_REPETITION",
            GameMethod::FivefoldRepetition => "FIVEFOLD_REPETITION",
            GameMethod::FiftyMoveRule => "50_MOVES",
            GameMethod::SeventyFiveMoveRule => "75_MOVES",
            GameMethod::InsufficientMaterial => "INSUFFICIENT_MATERIAL",
        }
    }

    /// Parses the draw basis a player asks for: `offer`, `threefold_repetition`
    /// or `50_moves`.
    pub fn from_draw_request(s: &str) -> Result<Self, ServiceError> {
        match s.to_ascii_lowercase().as_str() {
            "offer" => Ok(GameMethod::DrawOffer),
            "threefold_repetition" => Ok(GameMethod::ThreefoldRepetition),
            "50_moves" => Ok(GameMethod::FiftyMoveRule),
            _ => Err(ServiceError::InvalidInput(format!("Draw method {}", s))),
        }
    }

    /// Methods that can sit in a game's pending draw proposal.
    pub fn is_draw_proposal(self) -> bool {
        matches!(
            self,
            GameMethod::DrawOffer | GameMethod::ThreefoldRepetition | GameMethod::FiftyMoveRule
        )
    }
}

impl fmt::Display for GameMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps the rules crate's board status onto an outcome, given the side that
/// is to move in that position.
pub fn outcome_from_status(
    status: chess::BoardStatus,
    side_to_move: chess::Color,
) -> (GameOutcome, GameMethod) {
    match status {
        chess::BoardStatus::Ongoing => (GameOutcome::NoOutcome, GameMethod::NoMethod),
        chess::BoardStatus::Stalemate => (GameOutcome::Draw, GameMethod::Stalemate),
        chess::BoardStatus::Checkmate => (
            GameOutcome::win_for(PlayerColor::from(side_to_move).other()),
            GameMethod::Checkmate,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_method_store_mapping_is_total() {
        for method in GameMethod::ALL {
            let serialized = serde_json::to_string(&method).unwrap();
            assert_eq!(serialized, format!("\"{}\"", method.as_str()));
            assert_eq!(serde_json::from_str::<GameMethod>(&serialized).unwrap(), method);
        }
    }

    #[test]
    fn test_outcome_store_mapping_is_total() {
        for outcome in GameOutcome::ALL {
            let serialized = serde_json::to_string(&outcome).unwrap();
            assert_eq!(serialized, format!("\"{}\"", outcome.as_str()));
            assert_eq!(serde_json::from_str::<GameOutcome>(&serialized).unwrap(), outcome);
        }
    }

    #[test]
    fn test_unknown_store_values_are_errors() {
        assert!(serde_json::from_str::<GameMethod>("\"TIMEOUT\"").is_err());
        assert!(serde_json::from_str::<GameOutcome>("\"WHITE_RESIGNED\"").is_err());
    }

    #[rstest]
    #[case("offer", GameMethod::DrawOffer)]
    #[case("THREEFOLD_REPETITION", GameMethod::ThreefoldRepetition)]
    #[case("50_moves", GameMethod::FiftyMoveRule)]
    fn test_draw_request_parsing(#[case] input: &str, #[case] expected: GameMethod) {
        assert_eq!(GameMethod::from_draw_request(input).unwrap(), expected);
    }

    #[rstest]
    #[case("stalemate")]
    #[case("75_moves")]
    #[case("")]
    fn test_draw_request_rejects_other_methods(#[case] input: &str) {
        assert!(matches!(
            GameMethod::from_draw_request(input),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_checkmate_status_credits_the_side_that_moved() {
        let (outcome, method) =
            outcome_from_status(chess::BoardStatus::Checkmate, chess::Color::Black);
        assert_eq!(outcome, GameOutcome::WhiteWon);
        assert_eq!(method, GameMethod::Checkmate);
    }
}
