pub mod chessboard_repository;
pub mod errors;
pub mod game_repository;
pub mod invite_repository;
pub mod memory_repository;
pub mod pagination;
pub mod user_repository;
