use crate::models::chessboard::Chessboard;
use crate::repositories::errors::chessboard_repository_errors::ChessboardRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};

#[cfg(test)]
use mockall::automock;

pub struct DynamoDbChessboardRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbChessboardRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

/// Storage for registered boards. The two update methods are conditional and
/// report how many rows they changed (0 or 1).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChessboardRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the id is taken.
    async fn register_chessboard(
        &self,
        chessboard: &Chessboard,
    ) -> Result<(), ChessboardRepositoryError>;

    async fn get_chessboard(
        &self,
        onboard_id: u64,
    ) -> Result<Option<Chessboard>, ChessboardRepositoryError>;

    /// Sets the owner only if the board exists and has none yet.
    async fn assign_first_owner(
        &self,
        onboard_id: u64,
        owner_id: &str,
    ) -> Result<u64, ChessboardRepositoryError>;

    /// Clears the current game pointer if one is set.
    async fn clear_current_game(&self, onboard_id: u64) -> Result<u64, ChessboardRepositoryError>;
}

fn board_key(onboard_id: u64) -> AttributeValue {
    AttributeValue::N(onboard_id.to_string())
}

#[async_trait]
impl ChessboardRepository for DynamoDbChessboardRepository {
    async fn register_chessboard(
        &self,
        chessboard: &Chessboard,
    ) -> Result<(), ChessboardRepositoryError> {
        let item = to_item(chessboard)
            .map_err(|e| ChessboardRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(onboard_id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Err(ChessboardRepositoryError::AlreadyExists);
                    }
                }
                Err(ChessboardRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn get_chessboard(
        &self,
        onboard_id: u64,
    ) -> Result<Option<Chessboard>, ChessboardRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("onboard_id", board_key(onboard_id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| ChessboardRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            let chessboard: Chessboard = from_item(item)
                .map_err(|e| ChessboardRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(chessboard))
        } else {
            Ok(None)
        }
    }

    async fn assign_first_owner(
        &self,
        onboard_id: u64,
        owner_id: &str,
    ) -> Result<u64, ChessboardRepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("onboard_id", board_key(onboard_id))
            .update_expression("SET owner_id = :owner")
            .condition_expression("attribute_exists(onboard_id) AND attribute_not_exists(owner_id)")
            .expression_attribute_values(":owner", AttributeValue::S(owner_id.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(1),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Ok(0);
                    }
                }
                Err(ChessboardRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn clear_current_game(&self, onboard_id: u64) -> Result<u64, ChessboardRepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("onboard_id", board_key(onboard_id))
            .update_expression("REMOVE current_game_id")
            .condition_expression("attribute_exists(current_game_id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(1),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Ok(0);
                    }
                }
                Err(ChessboardRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }
}
