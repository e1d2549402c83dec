//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_document},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserRecord};
use crate::query::UserQuery;
use crate::repository::UserRepository;

pub const USERS_COLLECTION: &str = "users";

const DUPLICATE_KEY: i32 = 11000;
const NIN_INDEX: &str = "idx_profile_nin_unique";

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, USERS_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<User>(collection_name);
        Self { collection }
    }

    /// Create the unique and sort-supporting indexes. Safe to call on every start.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            // Only documents that carry a nin take part in uniqueness
            IndexModel::builder()
                .keys(doc! { "profile.nin": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name(NIN_INDEX.to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "profile.first_name": 1, "profile.last_name": 1 })
                .options(IndexOptions::builder().name("idx_name".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }
}

/// Map a unique-index violation to a conflict, anything else to a database error.
fn map_write_error(err: mongodb::error::Error) -> UserError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY {
            return if write_error.message.contains(NIN_INDEX) {
                UserError::Conflict("national id already in use".to_string())
            } else {
                UserError::EmailTaken
            };
        }
    }
    err.into()
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        self.collection
            .insert_one(&user)
            .await
            .map_err(map_write_error)?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: Document) -> UserResult<u64> {
        let count = self.collection.count_documents(filter).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn find(&self, query: UserQuery) -> UserResult<Vec<UserRecord>> {
        let mut options = FindOptions::builder()
            .sort(query.sort)
            .skip(query.skip)
            .limit(query.limit)
            .build();
        options.projection = query.projection;

        let cursor = self
            .collection
            .clone_with_type::<UserRecord>()
            .find(query.filter)
            .with_options(options)
            .await?;
        let records: Vec<UserRecord> = cursor.try_collect().await?;

        Ok(records)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: User) -> UserResult<User> {
        let mut fields = to_document(&user)?;
        fields.remove("_id");

        let result = self
            .collection
            .update_one(doc! { "_id": user.id.as_str() }, doc! { "$set": fields })
            .await
            .map_err(map_write_error)?;

        if result.matched_count == 0 {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> UserResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        tracing::info!(user_id = %id, deleted = result.deleted_count, "User delete processed");
        Ok(())
    }
}
