use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    models::{chessboard::Chessboard, user::User},
    repositories::{
        chessboard_repository::ChessboardRepository,
        errors::chessboard_repository_errors::ChessboardRepositoryError,
    },
    services::errors::service_errors::ServiceError,
};

#[derive(Clone)]
pub struct ChessboardService {
    repository: Arc<dyn ChessboardRepository + Send + Sync>,
}

impl ChessboardService {
    pub fn new(repository: Arc<dyn ChessboardRepository + Send + Sync>) -> Self {
        ChessboardService { repository }
    }

    /// Registers a board with no owner and no game. Duplicate ids are caught by
    /// the store's conditional insert.
    pub async fn register_chessboard(&self, onboard_id: u64) -> Result<Chessboard, ServiceError> {
        let chessboard = Chessboard::new(onboard_id);
        self.repository
            .register_chessboard(&chessboard)
            .await
            .map_err(|e| match e {
                ChessboardRepositoryError::AlreadyExists => {
                    ServiceError::AlreadyExists("Chessboard".to_string())
                }
                other => ServiceError::from(other),
            })?;

        info!("Registered chessboard {}", onboard_id);
        Ok(chessboard)
    }

    pub async fn fetch_chessboard(&self, onboard_id: u64) -> Result<Chessboard, ServiceError> {
        self.repository
            .get_chessboard(onboard_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Chessboard".to_string()))
    }

    /// Claims an unowned board for `user`. Ownership is never overwritten.
    pub async fn assign_first_owner(
        &self,
        board: &mut Chessboard,
        user: &User,
    ) -> Result<(), ServiceError> {
        if user.id.is_empty() {
            return Err(ServiceError::InvalidInput("Owner id".to_string()));
        }

        let rows = self
            .repository
            .assign_first_owner(board.onboard_id, &user.id)
            .await?;
        match rows {
            1 => {
                board.owner_id = Some(user.id.clone());
                info!("Chessboard {} claimed by user {}", board.onboard_id, user.id);
                Ok(())
            }
            0 => {
                // The condition also fails for boards that were never registered.
                self.fetch_chessboard(board.onboard_id).await?;
                warn!(
                    "User {} tried to claim owned chessboard {}",
                    user.id, board.onboard_id
                );
                Err(ServiceError::Conflict(
                    "Chessboard already has owner".to_string(),
                ))
            }
            n => Err(ServiceError::Internal(format!(
                "AssignFirstOwner affected {} rows",
                n
            ))),
        }
    }

    pub async fn leave_game(&self, board: &mut Chessboard) -> Result<(), ServiceError> {
        let rows = self.repository.clear_current_game(board.onboard_id).await?;
        if rows != 1 {
            return Err(ServiceError::Internal(format!(
                "LeaveGame for chessboard {} affected {} rows",
                board.onboard_id, rows
            )));
        }

        info!("Chessboard {} left its game", board.onboard_id);
        board.current_game_id = None;
        Ok(())
    }
}
