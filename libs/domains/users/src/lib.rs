//! Users Domain
//!
//! Registration, lookup, listing, update and deletion of user records stored
//! in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Email normalization, password hashing, paging
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + MongoDB implementation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Documents, DTOs, query building
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{MongoUserRepository, UserService, handlers};
//!
//! # async fn example(db: mongodb::Database) -> Result<(), domain_users::UserError> {
//! let repository = MongoUserRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let router = axum::Router::new().nest("/users", handlers::router(UserService::new(repository)));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    Address, PagedResult, Profile, RegisterResponse, RegisterUser, UpdateUser, User, UserRecord,
    UserResponse,
};
pub use self::mongodb::MongoUserRepository;
pub use query::{ListOptions, ListUsersParams, Pagination, SortField, SortOrder, UserQuery};
pub use repository::UserRepository;
pub use service::UserService;
