//! User Service - Business logic layer

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{
    PagedResult, RegisterUser, UpdateUser, User, UserResponse, canonical_email, normalize_email,
};
use crate::query::{ListOptions, UserQuery};
use crate::repository::UserRepository;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a new user.
    ///
    /// The email pre-check gives a friendly conflict; the unique index on
    /// insert is what actually guarantees uniqueness.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterUser) -> UserResult<UserResponse> {
        let email = normalize_email(&input.email)?;

        if self.repository.get_by_email(&email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new(&email, password_hash, input.profile)?;

        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, email = %created.email, "User registered");
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_email(&canonical_email(email))
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }

    /// Count, then fetch one page. The two reads are not a snapshot.
    #[instrument(skip(self, options), fields(page = options.page, page_size = options.page_size))]
    pub async fn list_users(&self, options: ListOptions) -> UserResult<PagedResult<UserResponse>> {
        let pagination = options.pagination();
        let query = UserQuery::from_options(&options);

        let total_count = self.repository.count(query.filter.clone()).await?;
        let records = self.repository.find(query).await?;

        tracing::debug!(total_count, returned = records.len(), "Listed users");

        let users = records.into_iter().map(UserResponse::from).collect();
        Ok(PagedResult::new(users, total_count, &pagination))
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        if let Some(raw) = input.email {
            let email = normalize_email(&raw)?;
            if email != user.email {
                if self.repository.get_by_email(&email).await?.is_some() {
                    return Err(UserError::EmailTaken);
                }
                user.email = email;
            }
        }

        if let Some(profile) = input.profile {
            user.profile = profile.normalized();
        }

        user.touch();

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    /// Idempotent: deleting an unknown id succeeds.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        self.repository.delete(id).await
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}
