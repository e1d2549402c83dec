use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::UserResult;
use crate::models::{User, UserRecord};
use crate::query::UserQuery;

/// Repository trait for User persistence
///
/// Absent documents are `Ok(None)`; turning them into `NotFound` is the
/// service's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate email maps to `EmailTaken`.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: &str) -> UserResult<Option<User>>;

    /// Exact match on the stored (already normalized) email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Number of documents matching `filter`, ignoring paging
    async fn count(&self, filter: Document) -> UserResult<u64>;

    /// Filtered, sorted, projected and paged read
    async fn find(&self, query: UserQuery) -> UserResult<Vec<UserRecord>>;

    /// Overwrite every field of an existing user except its id
    async fn update(&self, user: User) -> UserResult<User>;

    /// Remove by id. Removing an absent id is not an error.
    async fn delete(&self, id: &str) -> UserResult<()>;
}
