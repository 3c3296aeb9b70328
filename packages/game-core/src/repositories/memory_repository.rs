use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::chessboard::Chessboard;
use crate::models::color::PlayerColor;
use crate::models::game_session::{GameRecord, GameStateUpdate};
use crate::models::invite::Invite;
use crate::models::moves::MoveRecord;
use crate::models::outcome::GameMethod;
use crate::models::user::User;
use crate::repositories::chessboard_repository::ChessboardRepository;
use crate::repositories::errors::chessboard_repository_errors::ChessboardRepositoryError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::invite_repository_errors::InviteRepositoryError;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::invite_repository::InviteRepository;
use crate::repositories::user_repository::UserRepository;

/// In-memory storage for every table, for tests and local embedding.
///
/// A single lock covers all tables, so each call (the seating transaction
/// included) is applied atomically with respect to every other call.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    chessboards: HashMap<u64, Chessboard>,
    games: HashMap<String, GameRecord>,
    /// Per game, kept sorted by `move_num`.
    moves: HashMap<String, Vec<MoveRecord>>,
    invites: HashMap<String, Invite>,
    users: HashMap<String, User>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn game_count(&self) -> usize {
        self.inner.lock().games.len()
    }

    pub fn move_count(&self, game_id: &str) -> usize {
        self.inner.lock().moves.get(game_id).map_or(0, Vec::len)
    }

    /// Drops a game row and its moves, leaving any boards pointing at it.
    pub fn remove_game(&self, game_id: &str) {
        let mut inner = self.inner.lock();
        inner.games.remove(game_id);
        inner.moves.remove(game_id);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChessboardRepository for InMemoryStore {
    async fn register_chessboard(
        &self,
        chessboard: &Chessboard,
    ) -> Result<(), ChessboardRepositoryError> {
        let mut inner = self.inner.lock();
        if inner.chessboards.contains_key(&chessboard.onboard_id) {
            return Err(ChessboardRepositoryError::AlreadyExists);
        }
        inner
            .chessboards
            .insert(chessboard.onboard_id, chessboard.clone());
        Ok(())
    }

    async fn get_chessboard(
        &self,
        onboard_id: u64,
    ) -> Result<Option<Chessboard>, ChessboardRepositoryError> {
        Ok(self.inner.lock().chessboards.get(&onboard_id).cloned())
    }

    async fn assign_first_owner(
        &self,
        onboard_id: u64,
        owner_id: &str,
    ) -> Result<u64, ChessboardRepositoryError> {
        let mut inner = self.inner.lock();
        match inner.chessboards.get_mut(&onboard_id) {
            Some(board) if board.owner_id.is_none() => {
                board.owner_id = Some(owner_id.to_string());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn clear_current_game(&self, onboard_id: u64) -> Result<u64, ChessboardRepositoryError> {
        let mut inner = self.inner.lock();
        match inner.chessboards.get_mut(&onboard_id) {
            Some(board) if board.current_game_id.is_some() => {
                board.current_game_id = None;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[async_trait]
impl GameRepository for InMemoryStore {
    async fn create_game_and_seat(&self, game: &GameRecord) -> Result<u64, GameRepositoryError> {
        let mut inner = self.inner.lock();
        if inner.games.contains_key(&game.id) {
            return Ok(0);
        }

        let mut board_ids = vec![game.white_board_id, game.black_board_id];
        board_ids.dedup();

        let free = board_ids
            .iter()
            .filter(|id| {
                inner
                    .chessboards
                    .get(*id)
                    .map_or(false, |board| board.current_game_id.is_none())
            })
            .count() as u64;
        // Nothing is written unless both seats can be taken.
        if free != 2 {
            return Ok(free);
        }

        for id in &board_ids {
            if let Some(board) = inner.chessboards.get_mut(id) {
                board.current_game_id = Some(game.id.clone());
            }
        }
        inner.games.insert(game.id.clone(), game.clone());
        Ok(free)
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, GameRepositoryError> {
        Ok(self.inner.lock().games.get(game_id).cloned())
    }

    async fn update_game(
        &self,
        game_id: &str,
        update: &GameStateUpdate,
    ) -> Result<u64, GameRepositoryError> {
        let mut inner = self.inner.lock();
        match inner.games.get_mut(game_id) {
            Some(game) => {
                game.fen = update.fen.clone();
                game.turn = update.turn;
                game.outcome = update.outcome;
                game.method = update.method;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_draw_offer(
        &self,
        game_id: &str,
        offered_draw: GameMethod,
        offering_player: PlayerColor,
    ) -> Result<u64, GameRepositoryError> {
        let mut inner = self.inner.lock();
        match inner.games.get_mut(game_id) {
            Some(game) => {
                game.offered_draw = offered_draw;
                game.offering_player = offering_player;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn create_move(&self, record: &MoveRecord) -> Result<(), GameRepositoryError> {
        let mut inner = self.inner.lock();
        let moves = inner.moves.entry(record.game_id.clone()).or_default();
        if moves.iter().any(|m| m.move_num == record.move_num) {
            return Err(GameRepositoryError::AlreadyExists);
        }
        moves.push(record.clone());
        moves.sort_by_key(|m| m.move_num);
        Ok(())
    }

    async fn get_moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, GameRepositoryError> {
        Ok(self
            .inner
            .lock()
            .moves
            .get(game_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_last_move(&self, game_id: &str) -> Result<u64, GameRepositoryError> {
        let mut inner = self.inner.lock();
        match inner.moves.get_mut(game_id).and_then(Vec::pop) {
            Some(_) => Ok(1),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl InviteRepository for InMemoryStore {
    async fn create_invite(&self, invite: &Invite) -> Result<(), InviteRepositoryError> {
        let mut inner = self.inner.lock();
        if inner.invites.contains_key(&invite.id) {
            return Err(InviteRepositoryError::AlreadyExists);
        }
        inner.invites.insert(invite.id.clone(), invite.clone());
        Ok(())
    }

    async fn get_invite(&self, invite_id: &str) -> Result<Option<Invite>, InviteRepositoryError> {
        Ok(self.inner.lock().invites.get(invite_id).cloned())
    }

    async fn get_pending_invites(
        &self,
        user_id: &str,
    ) -> Result<Vec<Invite>, InviteRepositoryError> {
        let inner = self.inner.lock();
        let mut invites: Vec<Invite> = inner
            .invites
            .values()
            .filter(|invite| {
                !invite.declined && invite.recipient_user_id.as_deref() == Some(user_id)
            })
            .cloned()
            .collect();
        invites.sort_by_key(|invite| invite.created_at);
        Ok(invites)
    }

    async fn decline_invite(&self, invite_id: &str) -> Result<u64, InviteRepositoryError> {
        let mut inner = self.inner.lock();
        match inner.invites.get_mut(invite_id) {
            Some(invite) => {
                invite.declined = true;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_invite(&self, invite_id: &str) -> Result<u64, InviteRepositoryError> {
        Ok(self.inner.lock().invites.remove(invite_id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut inner = self.inner.lock();
        if inner.users.contains_key(&user.id) {
            return Err(UserRepositoryError::AlreadyExists);
        }
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.inner.lock().users.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::moves::{PieceKind, PlayedMove};
    use crate::models::position::STARTING_FEN;

    async fn store_with_boards(ids: &[u64]) -> InMemoryStore {
        let store = InMemoryStore::new();
        for id in ids {
            store
                .register_chessboard(&Chessboard::new(*id))
                .await
                .unwrap();
        }
        store
    }

    fn pawn_move(game_id: &str, move_num: u32) -> MoveRecord {
        MoveRecord::new(
            game_id,
            move_num,
            PlayedMove {
                player: PlayerColor::White,
                cell_from: "e2".to_string(),
                cell_to: "e4".to_string(),
                piece: PieceKind::Pawn,
                promotion: None,
                tags: Vec::new(),
            },
        )
    }

    #[tokio::test]
    async fn test_register_twice_fails() {
        let store = store_with_boards(&[7]).await;

        let result = store.register_chessboard(&Chessboard::new(7)).await;

        assert!(matches!(
            result,
            Err(ChessboardRepositoryError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_assign_first_owner_only_once() {
        let store = store_with_boards(&[7]).await;

        assert_eq!(store.assign_first_owner(7, "42").await.unwrap(), 1);
        assert_eq!(store.assign_first_owner(7, "99").await.unwrap(), 0);
        assert_eq!(store.assign_first_owner(8, "99").await.unwrap(), 0);

        let board = store.get_chessboard(7).await.unwrap().unwrap();
        assert_eq!(board.owner_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_seating_takes_both_boards() {
        let store = store_with_boards(&[1, 2]).await;
        let game = GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White);

        assert_eq!(store.create_game_and_seat(&game).await.unwrap(), 2);

        for id in [1, 2] {
            let board = store.get_chessboard(id).await.unwrap().unwrap();
            assert_eq!(board.current_game_id.as_deref(), Some(game.id.as_str()));
        }
        assert_eq!(store.game_count(), 1);
    }

    #[tokio::test]
    async fn test_seating_writes_nothing_when_a_board_is_taken() {
        let store = store_with_boards(&[1, 2, 3]).await;
        let first = GameRecord::new(1, 2, STARTING_FEN, PlayerColor::White);
        store.create_game_and_seat(&first).await.unwrap();

        let second = GameRecord::new(3, 2, STARTING_FEN, PlayerColor::White);
        assert_eq!(store.create_game_and_seat(&second).await.unwrap(), 1);

        let board = store.get_chessboard(3).await.unwrap().unwrap();
        assert!(board.current_game_id.is_none());
        assert_eq!(store.game_count(), 1);
    }

    #[tokio::test]
    async fn test_seating_same_board_twice_is_refused() {
        let store = store_with_boards(&[1]).await;
        let game = GameRecord::new(1, 1, STARTING_FEN, PlayerColor::White);

        assert_eq!(store.create_game_and_seat(&game).await.unwrap(), 1);
        assert_eq!(store.game_count(), 0);
    }

    #[tokio::test]
    async fn test_moves_are_unique_and_ordered() {
        let store = InMemoryStore::new();

        store.create_move(&pawn_move("g", 2)).await.unwrap();
        store.create_move(&pawn_move("g", 1)).await.unwrap();
        assert!(matches!(
            store.create_move(&pawn_move("g", 2)).await,
            Err(GameRepositoryError::AlreadyExists)
        ));

        let nums: Vec<u32> = store
            .get_moves("g")
            .await
            .unwrap()
            .iter()
            .map(|m| m.move_num)
            .collect();
        assert_eq!(nums, vec![1, 2]);

        assert_eq!(store.delete_last_move("g").await.unwrap(), 1);
        assert_eq!(store.delete_last_move("g").await.unwrap(), 1);
        assert_eq!(store.delete_last_move("g").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pending_invites_skip_declined() {
        let store = InMemoryStore::new();
        let first = Invite::direct(1, "user-2", None);
        let second = Invite::direct(3, "user-2", Some(PlayerColor::White));
        store.create_invite(&first).await.unwrap();
        store.create_invite(&second).await.unwrap();
        store.create_invite(&Invite::with_code(1, 123456, None)).await.unwrap();

        assert_eq!(store.get_pending_invites("user-2").await.unwrap().len(), 2);

        assert_eq!(store.decline_invite(&first.id).await.unwrap(), 1);
        let pending = store.get_pending_invites("user-2").await.unwrap();
        assert_eq!(pending, vec![second]);

        assert_eq!(store.decline_invite("missing").await.unwrap(), 0);
    }
}
