pub mod chessboard_repository_errors;
pub mod game_repository_errors;
pub mod invite_repository_errors;
pub mod user_repository_errors;
