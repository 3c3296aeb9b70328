pub mod chess_service_errors;
pub mod service_errors;
