use std::sync::Arc;

use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::service_errors::ServiceError;

/// Read access to user accounts, used to address invites.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User, ServiceError> {
        if user_id.is_empty() {
            return Err(ServiceError::InvalidInput("User id".to_string()));
        }
        self.repository
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))
    }
}
