use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type BookId = u64;
pub type UserId = u64;
pub type ReviewId = u64;

/// A book in the shop's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Unique across the catalog
    pub isbn: String,
    pub price: f64,
    pub description: String,
}

/// A registered account. Holds the password hash, so it never leaves the store;
/// see [`UserProfile`] for the public projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Registration input after validation and hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// What callers outside the store get to see of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// One user's rating of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub user_id: UserId,
    /// 1 through 5
    pub rating: u8,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Review input before an id is assigned.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: BookId,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: String,
    pub created_at: OffsetDateTime,
}
