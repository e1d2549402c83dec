//! Users API routes

use axum::Router;
use domain_users::{MongoUserRepository, UserResult, UserService, handlers};
use mongodb::Database;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoUserRepository::new(&state.db);
    let service = UserService::new(repository);

    handlers::router(service)
}

pub async fn init_indexes(db: &Database) -> UserResult<()> {
    MongoUserRepository::new(db).init_indexes().await
}
