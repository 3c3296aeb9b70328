pub mod chessboard;
pub mod color;
pub mod game_session;
pub mod invite;
pub mod moves;
pub mod outcome;
pub mod position;
pub mod user;
