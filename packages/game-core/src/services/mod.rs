pub mod chess_service;
pub mod chessboard_service;
pub mod errors;
pub mod game_session;
pub mod game_session_service;
pub mod invite_service;
pub mod user_service;
