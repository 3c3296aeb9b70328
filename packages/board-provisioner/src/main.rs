use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use game_core::config::TableNames;
use game_core::repositories::chessboard_repository::DynamoDbChessboardRepository;
use game_core::repositories::user_repository::DynamoDbUserRepository;
use game_core::services::chessboard_service::ChessboardService;
use game_core::services::errors::service_errors::ServiceError;
use game_core::services::user_service::UserService;

#[derive(Deserialize)]
struct ProvisionEvent {
    onboard_id: u64,
    #[serde(default)]
    owner_id: Option<String>,
}

#[derive(Serialize)]
struct ProvisionResponse {
    onboard_id: u64,
    owner_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    run(service_fn(board_provisioner_handler)).await
}

async fn board_provisioner_handler(
    event: LambdaEvent<ProvisionEvent>,
) -> Result<ProvisionResponse, Error> {
    let ProvisionEvent {
        onboard_id,
        owner_id,
    } = event.payload;

    let tables = TableNames::from_env()?;
    let config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&config);

    let chessboards = ChessboardService::new(Arc::new(DynamoDbChessboardRepository::new(
        client.clone(),
        tables.chessboards,
    )));
    let users = UserService::new(Arc::new(DynamoDbUserRepository::new(client, tables.users)));

    // Re-provisioning a known board only (re)tries the owner claim.
    let mut board = match chessboards.register_chessboard(onboard_id).await {
        Ok(board) => board,
        Err(ServiceError::AlreadyExists(_)) => {
            warn!("Chessboard {} already registered", onboard_id);
            chessboards
                .fetch_chessboard(onboard_id)
                .await
                .map_err(|e| Error::from(e.public_message()))?
        }
        Err(e) => return Err(Error::from(e.public_message())),
    };

    if let Some(owner_id) = owner_id {
        let owner = users
            .get_user_by_id(&owner_id)
            .await
            .map_err(|e| Error::from(e.public_message()))?;
        chessboards
            .assign_first_owner(&mut board, &owner)
            .await
            .map_err(|e| Error::from(e.public_message()))?;
    }

    info!("Chessboard {} provisioned", board.onboard_id);
    Ok(ProvisionResponse {
        onboard_id: board.onboard_id,
        owner_id: board.owner_id,
    })
}
