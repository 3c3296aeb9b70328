use crate::models::color::PlayerColor;
use crate::models::game_session::{GameRecord, GameStateUpdate};
use crate::models::moves::MoveRecord;
use crate::models::outcome::GameMethod;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::pagination::{collect_pages, resume_key, Page};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use tracing::warn;

#[cfg(test)]
use mockall::automock;

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub games_table: String,
    pub moves_table: String,
    pub chessboards_table: String,
}

impl DynamoDbGameRepository {
    pub fn new(
        client: Client,
        games_table: impl Into<String>,
        moves_table: impl Into<String>,
        chessboards_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            games_table: games_table.into(),
            moves_table: moves_table.into(),
            chessboards_table: chessboards_table.into(),
        }
    }
}

/// Storage for games and their move lists. Methods returning `u64` report
/// the number of rows they changed.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Inserts the game and points both of its boards at it in one atomic
    /// step. Returns 2 when committed; any other value means nothing was
    /// written.
    async fn create_game_and_seat(&self, game: &GameRecord) -> Result<u64, GameRepositoryError>;

    async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, GameRepositoryError>;

    async fn update_game(
        &self,
        game_id: &str,
        update: &GameStateUpdate,
    ) -> Result<u64, GameRepositoryError>;

    async fn update_draw_offer(
        &self,
        game_id: &str,
        offered_draw: GameMethod,
        offering_player: PlayerColor,
    ) -> Result<u64, GameRepositoryError>;

    /// Appends a move. A second write for the same `move_num` fails with
    /// `AlreadyExists`.
    async fn create_move(&self, record: &MoveRecord) -> Result<(), GameRepositoryError>;

    /// All moves of a game ordered by `move_num`.
    async fn get_moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, GameRepositoryError>;

    async fn delete_last_move(&self, game_id: &str) -> Result<u64, GameRepositoryError>;
}

fn is_conditional_failure<E, R>(e: &SdkError<E, R>, check: impl Fn(&E) -> bool) -> bool {
    match e {
        SdkError::ServiceError(service_err) => check(service_err.err()),
        _ => false,
    }
}

impl DynamoDbGameRepository {
    fn build_seat_board_item(
        &self,
        onboard_id: u64,
        game_id: &str,
    ) -> Result<TransactWriteItem, GameRepositoryError> {
        let update = Update::builder()
            .table_name(&self.chessboards_table)
            .key("onboard_id", AttributeValue::N(onboard_id.to_string()))
            .update_expression("SET current_game_id = :game")
            .condition_expression(
                "attribute_exists(onboard_id) AND attribute_not_exists(current_game_id)",
            )
            .expression_attribute_values(":game", AttributeValue::S(game_id.to_string()))
            .build()
            .map_err(|e| GameRepositoryError::TransactionError(e.to_string()))?;

        Ok(TransactWriteItem::builder().update(update).build())
    }

    fn build_create_game_item(
        &self,
        game: &GameRecord,
    ) -> Result<TransactWriteItem, GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let put = Put::builder()
            .table_name(&self.games_table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .build()
            .map_err(|e| GameRepositoryError::TransactionError(e.to_string()))?;

        Ok(TransactWriteItem::builder().put(put).build())
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn create_game_and_seat(&self, game: &GameRecord) -> Result<u64, GameRepositoryError> {
        let transact_items = vec![
            self.build_create_game_item(game)?,
            self.build_seat_board_item(game.white_board_id, &game.id)?,
            self.build_seat_board_item(game.black_board_id, &game.id)?,
        ];

        match self
            .client
            .transact_write_items()
            .set_transact_items(Some(transact_items))
            .send()
            .await
        {
            Ok(_) => Ok(2),
            Err(e) => {
                if let Some(TransactWriteItemsError::TransactionCanceledException(_)) =
                    e.as_service_error()
                {
                    warn!(
                        "Seating transaction cancelled for boards {} and {}",
                        game.white_board_id, game.black_board_id
                    );
                    return Ok(0);
                }
                Err(GameRepositoryError::TransactionError(e.to_string()))
            }
        }
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, GameRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.games_table)
            .key("id", AttributeValue::S(game_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            let game: GameRecord =
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(game))
        } else {
            Ok(None)
        }
    }

    async fn update_game(
        &self,
        game_id: &str,
        update: &GameStateUpdate,
    ) -> Result<u64, GameRepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.games_table)
            .key("id", AttributeValue::S(game_id.to_string()))
            .update_expression("SET #fen = :fen, #turn = :turn, #outcome = :outcome, #method = :method")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#fen", "fen")
            .expression_attribute_names("#turn", "turn")
            .expression_attribute_names("#outcome", "outcome")
            .expression_attribute_names("#method", "method")
            .expression_attribute_values(":fen", AttributeValue::S(update.fen.clone()))
            .expression_attribute_values(":turn", AttributeValue::S(update.turn.as_str().to_string()))
            .expression_attribute_values(
                ":outcome",
                AttributeValue::S(update.outcome.as_str().to_string()),
            )
            .expression_attribute_values(
                ":method",
                AttributeValue::S(update.method.as_str().to_string()),
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(1),
            Err(e) => {
                if is_conditional_failure(&e, |err| err.is_conditional_check_failed_exception()) {
                    return Ok(0);
                }
                Err(GameRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn update_draw_offer(
        &self,
        game_id: &str,
        offered_draw: GameMethod,
        offering_player: PlayerColor,
    ) -> Result<u64, GameRepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.games_table)
            .key("id", AttributeValue::S(game_id.to_string()))
            .update_expression("SET offered_draw = :offered, offering_player = :player")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_values(
                ":offered",
                AttributeValue::S(offered_draw.as_str().to_string()),
            )
            .expression_attribute_values(
                ":player",
                AttributeValue::S(offering_player.as_str().to_string()),
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(1),
            Err(e) => {
                if is_conditional_failure(&e, |err| err.is_conditional_check_failed_exception()) {
                    return Ok(0);
                }
                Err(GameRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn create_move(&self, record: &MoveRecord) -> Result<(), GameRepositoryError> {
        let item =
            to_item(record).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .put_item()
            .table_name(&self.moves_table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(move_num)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if is_conditional_failure(&e, |err| err.is_conditional_check_failed_exception()) {
                    return Err(GameRepositoryError::AlreadyExists);
                }
                Err(GameRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn get_moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, GameRepositoryError> {
        collect_pages(|start_key| {
            let request = self
                .client
                .query()
                .table_name(&self.moves_table)
                .key_condition_expression("game_id = :game")
                .expression_attribute_values(":game", AttributeValue::S(game_id.to_string()))
                .consistent_read(true)
                .scan_index_forward(true)
                .set_exclusive_start_key(start_key);

            async move {
                let output = request
                    .send()
                    .await
                    .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

                let items = output
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(|item| {
                        from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))
                    })
                    .collect::<Result<Vec<MoveRecord>, _>>()?;

                Ok(Page {
                    items,
                    next: resume_key(output.last_evaluated_key),
                })
            }
        })
        .await
    }

    async fn delete_last_move(&self, game_id: &str) -> Result<u64, GameRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.moves_table)
            .key_condition_expression("game_id = :game")
            .expression_attribute_values(":game", AttributeValue::S(game_id.to_string()))
            .consistent_read(true)
            .scan_index_forward(false)
            .limit(1)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        let last: MoveRecord = match output.items.unwrap_or_default().into_iter().next() {
            Some(item) => {
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?
            }
            None => return Ok(0),
        };

        let result = self
            .client
            .delete_item()
            .table_name(&self.moves_table)
            .key("game_id", AttributeValue::S(last.game_id.clone()))
            .key("move_num", AttributeValue::N(last.move_num.to_string()))
            .condition_expression("attribute_exists(move_num)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(1),
            Err(e) => {
                if is_conditional_failure(&e, |err| err.is_conditional_check_failed_exception()) {
                    return Ok(0);
                }
                Err(GameRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }
}
