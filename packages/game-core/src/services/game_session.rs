use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    models::{
        chessboard::Chessboard,
        color::PlayerColor,
        game_session::GameStateUpdate,
        moves::MoveRecord,
        outcome::{GameMethod, GameOutcome},
        position::Position,
    },
    repositories::{
        errors::game_repository_errors::GameRepositoryError, game_repository::GameRepository,
    },
    services::{chess_service::ChessService, errors::service_errors::ServiceError},
};

/// One game, loaded for the duration of a request.
///
/// Moves and draw negotiation are persisted as they happen. Position level
/// results (moves, resignation, accepted draws) reach the game row only on
/// [`GameSession::save`].
pub struct GameSession {
    id: String,
    white: Chessboard,
    black: Chessboard,
    initial_fen: String,
    position: Position,
    moves: Vec<MoveRecord>,
    offered_draw: GameMethod,
    offering_player: PlayerColor,
    chess: ChessService,
    repository: Arc<dyn GameRepository + Send + Sync>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("white", &self.white.onboard_id)
            .field("black", &self.black.onboard_id)
            .field("fen", &self.position.fen())
            .field("outcome", &self.position.outcome())
            .field("method", &self.position.method())
            .field("offered_draw", &self.offered_draw)
            .field("moves", &self.moves.len())
            .finish()
    }
}

impl GameSession {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        white: Chessboard,
        black: Chessboard,
        initial_fen: String,
        position: Position,
        moves: Vec<MoveRecord>,
        offered_draw: GameMethod,
        offering_player: PlayerColor,
        chess: ChessService,
        repository: Arc<dyn GameRepository + Send + Sync>,
    ) -> Self {
        GameSession {
            id,
            white,
            black,
            initial_fen,
            position,
            moves,
            offered_draw,
            offering_player,
            chess,
            repository,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn white(&self) -> &Chessboard {
        &self.white
    }

    pub fn black(&self) -> &Chessboard {
        &self.black
    }

    pub fn initial_fen(&self) -> &str {
        &self.initial_fen
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> PlayerColor {
        self.chess.turn_of(&self.position)
    }

    /// The board whose turn it is.
    pub fn current_mover(&self) -> &Chessboard {
        match self.turn() {
            PlayerColor::White => &self.white,
            PlayerColor::Black => &self.black,
        }
    }

    pub fn fen(&self) -> String {
        self.chess.to_fen(&self.position)
    }

    pub fn outcome(&self) -> GameOutcome {
        self.chess.outcome(&self.position).0
    }

    pub fn method(&self) -> GameMethod {
        self.chess.outcome(&self.position).1
    }

    pub fn offered_draw(&self) -> GameMethod {
        self.offered_draw
    }

    pub fn offering_player(&self) -> PlayerColor {
        self.offering_player
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub fn legal_moves(&self) -> Vec<String> {
        self.chess.legal_moves(&self.position)
    }

    pub fn in_check(&self) -> bool {
        self.position.in_check()
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_terminal()
    }

    pub fn render_board(&self) -> String {
        self.position.render()
    }

    /// Color played by `board`, if it takes part in this game.
    pub fn color_of(&self, board: &Chessboard) -> Option<PlayerColor> {
        if board.onboard_id == self.white.onboard_id {
            Some(PlayerColor::White)
        } else if board.onboard_id == self.black.onboard_id {
            Some(PlayerColor::Black)
        } else {
            None
        }
    }

    fn ensure_active(&self) -> Result<(), ServiceError> {
        if self.is_over() {
            return Err(ServiceError::Conflict("Game is already over".to_string()));
        }
        Ok(())
    }

    pub async fn make_move(&mut self, mover: &Chessboard, token: &str) -> Result<(), ServiceError> {
        self.ensure_active()?;
        if self.current_mover().onboard_id != mover.onboard_id {
            return Err(ServiceError::Forbidden("Not your turn".to_string()));
        }

        let (next, played) = self.chess.apply_move(&self.position, token)?;
        let record = MoveRecord::new(&self.id, self.moves.len() as u32 + 1, played);

        self.repository
            .create_move(&record)
            .await
            .map_err(|e| match e {
                GameRepositoryError::AlreadyExists => {
                    warn!("Move {} of game {} was already recorded", record.move_num, self.id);
                    ServiceError::Conflict("Game was updated concurrently".to_string())
                }
                other => ServiceError::from(other),
            })?;

        info!(
            "Board {} played {} in game {}",
            mover.onboard_id,
            record.uci(),
            self.id
        );
        self.position = next;
        self.moves.push(record);
        Ok(())
    }

    pub async fn save(&self) -> Result<(), ServiceError> {
        let update = GameStateUpdate {
            fen: self.fen(),
            turn: self.turn(),
            outcome: self.outcome(),
            method: self.method(),
        };

        let rows = self.repository.update_game(&self.id, &update).await?;
        if rows != 1 {
            return Err(ServiceError::NotFound("Game".to_string()));
        }
        Ok(())
    }

    /// Removes the last move and rebuilds the session from what remains.
    /// A pending draw offer does not survive.
    pub async fn undo_move(&mut self) -> Result<(), ServiceError> {
        if self.moves.is_empty() {
            return Err(ServiceError::Forbidden("No moves to undo".to_string()));
        }

        let rows = self.repository.delete_last_move(&self.id).await?;
        if rows != 1 {
            return Err(ServiceError::Internal(format!(
                "UndoMove deleted {} moves of game {}",
                rows, self.id
            )));
        }

        let moves = self.repository.get_moves(&self.id).await?;
        self.position = self.chess.replay(&self.initial_fen, &moves)?;
        self.moves = moves;

        if self.offered_draw != GameMethod::NoMethod {
            self.persist_draw_offer(GameMethod::NoMethod, PlayerColor::White)
                .await?;
        }
        self.offered_draw = GameMethod::NoMethod;
        self.offering_player = PlayerColor::White;

        info!("Undid last move of game {}", self.id);
        Ok(())
    }

    pub fn resign_game(&mut self, board: &Chessboard) -> Result<(), ServiceError> {
        self.ensure_active()?;
        let color = self
            .color_of(board)
            .ok_or_else(|| ServiceError::InvalidInput("Resigning chessboard".to_string()))?;

        self.position = self.chess.resign(&self.position, color)?;
        info!("Board {} resigned game {}", board.onboard_id, self.id);
        Ok(())
    }

    pub async fn offer_draw(
        &mut self,
        board: &Chessboard,
        method: GameMethod,
    ) -> Result<(), ServiceError> {
        self.ensure_active()?;
        if !self
            .chess
            .eligible_draw_methods(&self.position)
            .contains(&method)
        {
            return Err(ServiceError::Conflict(format!(
                "{} is not an eligible draw method",
                method
            )));
        }

        let color = self
            .color_of(board)
            .ok_or_else(|| ServiceError::InvalidInput("Offering chessboard".to_string()))?;

        if self.offered_draw != GameMethod::NoMethod && self.offered_draw != method {
            return Err(ServiceError::Conflict(format!(
                "A {} draw offer is already pending",
                self.offered_draw
            )));
        }

        // Re-asserting the pending method leaves it with its original offerer.
        let offering_player = if self.offered_draw == method {
            self.offering_player
        } else {
            color
        };

        self.persist_draw_offer(method, offering_player).await?;
        self.offered_draw = method;
        self.offering_player = offering_player;

        info!(
            "Board {} offered a {} draw in game {}",
            board.onboard_id, method, self.id
        );
        Ok(())
    }

    /// The color of `board` when it may answer the pending draw offer.
    fn draw_responder(&self, board: &Chessboard) -> Result<PlayerColor, ServiceError> {
        if !self.offered_draw.is_draw_proposal() {
            return Err(ServiceError::Conflict("No draw offer is pending".to_string()));
        }

        let color = self
            .color_of(board)
            .ok_or_else(|| ServiceError::Forbidden("Not a player in this game".to_string()))?;
        if color == self.offering_player {
            return Err(ServiceError::Conflict(
                "Cannot respond to your own draw offer".to_string(),
            ));
        }
        Ok(color)
    }

    pub fn accept_draw(&mut self, board: &Chessboard) -> Result<(), ServiceError> {
        self.ensure_active()?;
        self.draw_responder(board)?;

        self.position = self.chess.apply_draw(&self.position, self.offered_draw)?;
        info!(
            "Board {} accepted the {} draw in game {}",
            board.onboard_id, self.offered_draw, self.id
        );
        Ok(())
    }

    pub async fn reject_draw(&mut self, board: &Chessboard) -> Result<(), ServiceError> {
        self.ensure_active()?;
        self.draw_responder(board)?;

        self.persist_draw_offer(GameMethod::NoMethod, PlayerColor::White)
            .await?;
        info!(
            "Board {} rejected the {} draw in game {}",
            board.onboard_id, self.offered_draw, self.id
        );
        self.offered_draw = GameMethod::NoMethod;
        self.offering_player = PlayerColor::White;
        Ok(())
    }

    async fn persist_draw_offer(
        &self,
        method: GameMethod,
        color: PlayerColor,
    ) -> Result<(), ServiceError> {
        let rows = self
            .repository
            .update_draw_offer(&self.id, method, color)
            .await?;
        if rows != 1 {
            warn!("Draw offer update for game {} affected {} rows", self.id, rows);
            return Err(ServiceError::Internal(format!(
                "Draw offer update affected {} rows",
                rows
            )));
        }
        Ok(())
    }
}
