use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::InsertUser, schema::UserEntity},
};

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    /// Case-insensitive exact match.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError>;

    /// Case-insensitive substring match over first name, last name and "first last".
    async fn search_by_name(
        &self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn count_by_name(&self, term: &str) -> Result<i64, error::SystemError>;
}
