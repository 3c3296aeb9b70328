use crate::models::invite::Invite;
use crate::repositories::errors::invite_repository_errors::InviteRepositoryError;
use crate::repositories::pagination::{collect_pages, resume_key, Page};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};

#[cfg(test)]
use mockall::automock;

pub const INVITES_BY_RECIPIENT_INDEX: &str = "GSI_InviteByRecipient";

pub struct DynamoDbInviteRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbInviteRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Fails with `AlreadyExists` when an invite with the same id is stored.
    async fn create_invite(&self, invite: &Invite) -> Result<(), InviteRepositoryError>;

    async fn get_invite(&self, invite_id: &str) -> Result<Option<Invite>, InviteRepositoryError>;

    /// Undeclined invites addressed to `user_id`.
    async fn get_pending_invites(&self, user_id: &str)
        -> Result<Vec<Invite>, InviteRepositoryError>;

    async fn decline_invite(&self, invite_id: &str) -> Result<u64, InviteRepositoryError>;

    async fn delete_invite(&self, invite_id: &str) -> Result<u64, InviteRepositoryError>;
}

#[async_trait]
impl InviteRepository for DynamoDbInviteRepository {
    async fn create_invite(&self, invite: &Invite) -> Result<(), InviteRepositoryError> {
        let item =
            to_item(invite).map_err(|e| InviteRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Err(InviteRepositoryError::AlreadyExists);
                    }
                }
                Err(InviteRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn get_invite(&self, invite_id: &str) -> Result<Option<Invite>, InviteRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(invite_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| InviteRepositoryError::DynamoDb(e.to_string()))?;

        match result.item {
            Some(item) => {
                let invite: Invite = from_item(item)
                    .map_err(|e| InviteRepositoryError::Serialization(e.to_string()))?;
                Ok(Some(invite))
            }
            None => Ok(None),
        }
    }

    async fn get_pending_invites(
        &self,
        user_id: &str,
    ) -> Result<Vec<Invite>, InviteRepositoryError> {
        let mut invites = collect_pages(|start_key| {
            let request = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(INVITES_BY_RECIPIENT_INDEX)
                .key_condition_expression("recipient_user_id = :user")
                .filter_expression("declined = :declined")
                .expression_attribute_values(":user", AttributeValue::S(user_id.to_string()))
                .expression_attribute_values(":declined", AttributeValue::Bool(false))
                .set_exclusive_start_key(start_key);

            async move {
                let output = request
                    .send()
                    .await
                    .map_err(|e| InviteRepositoryError::DynamoDb(e.to_string()))?;

                let items = output
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(|item| {
                        from_item(item)
                            .map_err(|e| InviteRepositoryError::Serialization(e.to_string()))
                    })
                    .collect::<Result<Vec<Invite>, _>>()?;

                Ok(Page {
                    items,
                    next: resume_key(output.last_evaluated_key),
                })
            }
        })
        .await?;

        invites.sort_by_key(|invite| invite.created_at);
        Ok(invites)
    }

    async fn decline_invite(&self, invite_id: &str) -> Result<u64, InviteRepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(invite_id.to_string()))
            .update_expression("SET declined = :declined")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_values(":declined", AttributeValue::Bool(true))
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
                Err(InviteRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn delete_invite(&self, invite_id: &str) -> Result<u64, InviteRepositoryError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(invite_id.to_string()))
            .condition_expression("attribute_exists(id)")
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
                Err(InviteRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }
}
