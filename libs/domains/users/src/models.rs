use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::query::Pagination;

/// Postal address, every part optional in storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct Address {
    #[schema(example = "123 Main St")]
    #[validate(length(max = 200))]
    pub street: String,
    #[schema(example = "New York")]
    #[validate(length(max = 100))]
    pub city: String,
    #[schema(example = "NY")]
    #[validate(length(max = 100))]
    pub state: String,
    #[schema(example = "USA")]
    #[validate(length(max = 100))]
    pub country: String,
    #[schema(example = "10001")]
    #[validate(length(max = 20))]
    pub zip_code: String,
}

/// Personal details embedded in a user document as `profile`
///
/// Missing keys decode to defaults so that projected reads such as
/// `fields=profile.first_name` still produce a `Profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct Profile {
    #[schema(example = "John")]
    #[validate(length(max = 100))]
    pub first_name: String,
    #[schema(example = "Doe")]
    #[validate(length(max = 100))]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "+1-555-123-4567")]
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "1990-05-15")]
    pub birthdate: Option<String>,
    /// National identification number, unique across users when present
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "123-45-6789")]
    #[validate(length(max = 64))]
    pub nin: Option<String>,
}

impl Profile {
    /// Trim names and turn blank optional values into absent ones.
    ///
    /// A blank `nin` must not be stored: the sparse unique index would treat
    /// every empty string as the same value.
    pub fn normalized(self) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            address: self.address.filter(|a| *a != Address::default()),
            phone: present(self.phone),
            birthdate: present(self.birthdate),
            nin: present(self.nin),
        }
    }
}

/// Lowercased, trimmed form used for storage and lookups.
pub fn canonical_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Canonicalize an email and reject values without `@`.
pub fn normalize_email(raw: &str) -> UserResult<String> {
    let email = canonical_email(raw);
    if !email.contains('@') {
        return Err(UserError::Validation("invalid email address".to_string()));
    }
    Ok(email)
}

/// Stored user document (collection `users`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// UUIDv7 string, time-orderable
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub profile: Profile,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl User {
    /// Build a new user with a fresh id and both timestamps set to now.
    pub fn new(email: &str, password_hash: String, profile: Profile) -> UserResult<Self> {
        let email = normalize_email(email)?;
        let now = bson::DateTime::now();

        Ok(Self {
            id: Uuid::now_v7().to_string(),
            email,
            password_hash,
            profile: profile.normalized(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn touch(&mut self) {
        self.updated_at = bson::DateTime::now();
    }
}

/// A user document as returned by a possibly projected read.
///
/// Fields left out by the projection stay `None`; the password hash is never read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub email: Option<String>,
    pub profile: Option<Profile>,
    pub created_at: Option<bson::DateTime>,
    pub updated_at: Option<bson::DateTime>,
}

fn to_chrono(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

/// Outward JSON view of a user; absent fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "01938f0e-7c3a-7b52-9d1e-4a2f8c6b1d20")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "john.doe@example.com")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            email: Some(user.email),
            profile: Some(user.profile),
            created_at: Some(to_chrono(user.created_at)),
            updated_at: Some(to_chrono(user.updated_at)),
        }
    }
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            profile: record.profile,
            created_at: record.created_at.map(to_chrono),
            updated_at: record.updated_at.map(to_chrono),
        }
    }
}

/// Registration request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[schema(example = "john.doe@example.com")]
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[schema(example = "securePassword123")]
    #[validate(length(min = 6, max = 128, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(nested)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
    pub user: UserResponse,
}

/// Partial update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255))]
    pub email: Option<String>,
    #[validate(nested)]
    pub profile: Option<Profile>,
}

/// One page of results plus the totals needed to navigate the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PagedResult<T> {
    pub users: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    pub fn new(users: Vec<T>, total_count: u64, pagination: &Pagination) -> Self {
        Self {
            users,
            total_count,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: pagination.total_pages(total_count),
        }
    }
}
