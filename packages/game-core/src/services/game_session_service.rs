use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    models::{
        chessboard::Chessboard,
        color::PlayerColor,
        game_session::GameRecord,
        outcome::GameMethod,
        position::Position,
    },
    repositories::{chessboard_repository::ChessboardRepository, game_repository::GameRepository},
    services::{
        chess_service::ChessService, errors::service_errors::ServiceError,
        game_session::GameSession,
    },
};

#[derive(Clone)]
pub struct GameSessionService {
    games: Arc<dyn GameRepository + Send + Sync>,
    chessboards: Arc<dyn ChessboardRepository + Send + Sync>,
    chess: ChessService,
}

impl GameSessionService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        chessboards: Arc<dyn ChessboardRepository + Send + Sync>,
    ) -> Self {
        GameSessionService {
            games,
            chessboards,
            chess: ChessService::new(),
        }
    }

    /// Starts a game from the standard position and seats both boards in it.
    /// On success the boards' `current_game_id` point at the new game.
    pub async fn create_game(
        &self,
        white: &mut Chessboard,
        black: &mut Chessboard,
    ) -> Result<GameSession, ServiceError> {
        let position = self.chess.new_game();
        self.seat(white, black, position).await
    }

    pub async fn create_game_from_position(
        &self,
        white: &mut Chessboard,
        black: &mut Chessboard,
        fen: &str,
    ) -> Result<GameSession, ServiceError> {
        let position = self.chess.new_game_from_position(fen)?;
        self.seat(white, black, position).await
    }

    async fn seat(
        &self,
        white: &mut Chessboard,
        black: &mut Chessboard,
        position: Position,
    ) -> Result<GameSession, ServiceError> {
        if white.onboard_id == black.onboard_id {
            return Err(ServiceError::InvalidInput("Opponent chessboard".to_string()));
        }
        if white.is_in_game() || black.is_in_game() {
            return Err(ServiceError::Conflict("Player(s) already in game".to_string()));
        }

        let record = GameRecord::new(
            white.onboard_id,
            black.onboard_id,
            &position.fen(),
            position.turn(),
        );

        let seated = self.games.create_game_and_seat(&record).await?;
        if seated != 2 {
            warn!(
                "Seating boards {} and {} affected {} rows",
                white.onboard_id, black.onboard_id, seated
            );
            return Err(ServiceError::Internal(format!(
                "CreateChessGame seated {} boards instead of 2",
                seated
            )));
        }

        white.current_game_id = Some(record.id.clone());
        black.current_game_id = Some(record.id.clone());
        info!(
            "Created game {} (white {}, black {})",
            record.id, white.onboard_id, black.onboard_id
        );

        Ok(GameSession::new(
            record.id,
            white.clone(),
            black.clone(),
            record.initial_fen,
            position,
            Vec::new(),
            GameMethod::NoMethod,
            PlayerColor::White,
            self.chess.clone(),
            self.games.clone(),
        ))
    }

    /// Loads a game and rebuilds its position by replaying the stored moves.
    pub async fn fetch_game(&self, game_id: &str) -> Result<GameSession, ServiceError> {
        let record = self
            .games
            .get_game(game_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Game".to_string()))?;

        let white = self.participant(&record, record.white_board_id).await?;
        let black = self.participant(&record, record.black_board_id).await?;

        let moves = self.games.get_moves(game_id).await?;
        let mut position = self.chess.replay(&record.initial_fen, &moves)?;

        // Resignations and agreed draws are not visible in the moves.
        if !position.outcome().is_terminal() && record.outcome.is_terminal() {
            position.conclude(record.outcome, record.method);
        }

        Ok(GameSession::new(
            record.id,
            white,
            black,
            record.initial_fen,
            position,
            moves,
            record.offered_draw,
            record.offering_player,
            self.chess.clone(),
            self.games.clone(),
        ))
    }

    async fn participant(
        &self,
        record: &GameRecord,
        onboard_id: u64,
    ) -> Result<Chessboard, ServiceError> {
        self.chessboards
            .get_chessboard(onboard_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(format!(
                    "Game {} references missing chessboard {}",
                    record.id, onboard_id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::GameOutcome;
    use crate::models::position::STARTING_FEN;
    use crate::repositories::chessboard_repository::MockChessboardRepository;
    use crate::repositories::errors::game_repository_errors::GameRepositoryError;
    use crate::repositories::game_repository::MockGameRepository;

    fn service(games: MockGameRepository, boards: MockChessboardRepository) -> GameSessionService {
        GameSessionService::new(Arc::new(games), Arc::new(boards))
    }

    #[tokio::test]
    async fn test_create_game_sets_current_game_after_commit() {
        let mut games = MockGameRepository::new();
        games
            .expect_create_game_and_seat()
            .withf(|record| record.white_board_id == 1 && record.black_board_id == 2)
            .times(1)
            .returning(|_| Ok(2));
        let service = service(games, MockChessboardRepository::new());
        let (mut white, mut black) = (Chessboard::new(1), Chessboard::new(2));

        let session = service.create_game(&mut white, &mut black).await.unwrap();

        assert_eq!(white.current_game_id.as_deref(), Some(session.id()));
        assert_eq!(black.current_game_id.as_deref(), Some(session.id()));
        assert_eq!(session.fen(), STARTING_FEN);
        assert_eq!(session.turn(), PlayerColor::White);
    }

    #[tokio::test]
    async fn test_create_game_partial_seating_is_internal() {
        let mut games = MockGameRepository::new();
        games.expect_create_game_and_seat().returning(|_| Ok(1));
        let service = service(games, MockChessboardRepository::new());
        let (mut white, mut black) = (Chessboard::new(1), Chessboard::new(2));

        let result = service.create_game(&mut white, &mut black).await;

        assert!(matches!(result, Err(ServiceError::Internal(_))));
        assert!(white.current_game_id.is_none());
        assert!(black.current_game_id.is_none());
    }

    #[tokio::test]
    async fn test_create_game_rejects_seated_or_identical_boards() {
        let service = service(MockGameRepository::new(), MockChessboardRepository::new());
        let mut seated = Chessboard::new(1);
        seated.current_game_id = Some("other".to_string());

        assert_eq!(
            service
                .create_game(&mut seated, &mut Chessboard::new(2))
                .await
                .unwrap_err(),
            ServiceError::Conflict("Player(s) already in game".to_string())
        );
        assert!(matches!(
            service
                .create_game(&mut Chessboard::new(3), &mut Chessboard::new(3))
                .await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_create_game_from_bad_fen_is_invalid_input() {
        let service = service(MockGameRepository::new(), MockChessboardRepository::new());

        let result = service
            .create_game_from_position(&mut Chessboard::new(1), &mut Chessboard::new(2), "nope")
            .await;

        assert_eq!(
            result.unwrap_err(),
            ServiceError::InvalidInput("FEN".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_missing_game_is_not_found() {
        let mut games = MockGameRepository::new();
        games.expect_get_game().returning(|_| Ok(None));
        let service = service(games, MockChessboardRepository::new());

        assert_eq!(
            service.fetch_game("missing").await.unwrap_err(),
            ServiceError::NotFound("Game".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_game_with_missing_board_is_internal() {
        let mut games = MockGameRepository::new();
        games
            .expect_get_game()
            .returning(|_| Ok(Some(GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White))));
        let mut boards = MockChessboardRepository::new();
        boards
            .expect_get_chessboard()
            .returning(|id| Ok((id == 1).then(|| Chessboard::new(1))));
        let service = service(games, boards);

        let result = service.fetch_game("game").await;

        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }

    #[tokio::test]
    async fn test_fetch_game_restores_resignation_and_offer() {
        let mut games = MockGameRepository::new();
        games.expect_get_game().returning(|_| {
            let mut record = GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White);
            record.outcome = GameOutcome::BlackWon;
            record.method = GameMethod::Resignation;
            record.offered_draw = GameMethod::DrawOffer;
            record.offering_player = PlayerColor::Black;
            Ok(Some(record))
        });
        games.expect_get_moves().returning(|_| Ok(Vec::new()));
        let mut boards = MockChessboardRepository::new();
        boards
            .expect_get_chessboard()
            .returning(|id| Ok(Some(Chessboard::new(id))));
        let service = service(games, boards);

        let session = service.fetch_game("game").await.unwrap();

        assert_eq!(session.outcome(), GameOutcome::BlackWon);
        assert_eq!(session.method(), GameMethod::Resignation);
        assert_eq!(session.offered_draw(), GameMethod::DrawOffer);
        assert_eq!(session.offering_player(), PlayerColor::Black);
        assert!(session.is_over());
    }

    #[tokio::test]
    async fn test_fetch_game_driver_error_is_internal() {
        let mut games = MockGameRepository::new();
        games
            .expect_get_game()
            .returning(|_| Err(GameRepositoryError::DynamoDb("unavailable".to_string())));
        let service = service(games, MockChessboardRepository::new());

        let err = service.fetch_game("game").await.unwrap_err();

        assert!(err.is_sensitive());
        assert_eq!(err.public_message(), "Internal error");
    }
}
