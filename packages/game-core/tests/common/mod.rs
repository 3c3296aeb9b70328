#![allow(dead_code)]

use std::sync::Arc;

use game_core::models::chessboard::Chessboard;
use game_core::models::user::User;
use game_core::repositories::memory_repository::InMemoryStore;
use game_core::repositories::user_repository::UserRepository;
use game_core::services::chessboard_service::ChessboardService;
use game_core::services::game_session::GameSession;
use game_core::services::game_session_service::GameSessionService;
use game_core::services::invite_service::InviteService;
use game_core::services::user_service::UserService;

/// Every service wired to one shared in-memory store.
#[derive(Clone)]
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub chessboards: ChessboardService,
    pub games: GameSessionService,
    pub invites: InviteService,
    pub users: UserService,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let games = GameSessionService::new(store.clone(), store.clone());

        Harness {
            chessboards: ChessboardService::new(store.clone()),
            invites: InviteService::new(store.clone(), store.clone(), store.clone(), games.clone()),
            users: UserService::new(store.clone()),
            games,
            store,
        }
    }

    pub async fn board(&self, onboard_id: u64) -> Chessboard {
        self.chessboards
            .register_chessboard(onboard_id)
            .await
            .expect("Failed to register chessboard")
    }

    pub async fn user(&self, username: &str) -> User {
        let user = User::new(username.to_string(), format!("{}@example.com", username));
        self.store
            .create_user(&user)
            .await
            .expect("Failed to create user");
        user
    }

    /// Registers a board and claims it for `owner`.
    pub async fn owned_board(&self, onboard_id: u64, owner: &User) -> Chessboard {
        let mut board = self.board(onboard_id).await;
        self.chessboards
            .assign_first_owner(&mut board, owner)
            .await
            .expect("Failed to assign owner");
        board
    }

    pub async fn new_game(&self, white: u64, black: u64) -> (Chessboard, Chessboard, GameSession) {
        let mut white = self.board(white).await;
        let mut black = self.board(black).await;
        let game = self
            .games
            .create_game(&mut white, &mut black)
            .await
            .expect("Failed to create game");
        (white, black, game)
    }

    pub async fn play(&self, game: &mut GameSession, white: &Chessboard, black: &Chessboard, moves: &[&str]) {
        for token in moves {
            let mover = if game.current_mover().onboard_id == white.onboard_id {
                white
            } else {
                black
            };
            game.make_move(mover, token)
                .await
                .unwrap_or_else(|e| panic!("Move {} was refused: {}", token, e));
        }
    }
}
