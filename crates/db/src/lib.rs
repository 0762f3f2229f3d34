//! Catalog store: the in-memory book, user, and review collections and the
//! rules for reading and mutating them.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod seed;
pub mod store;

pub use error::StoreError;
pub use memory::InMemoryCatalog;
pub use models::{Book, BookId, Review, ReviewId, User, UserId, UserProfile};
pub use repository::CatalogRepository;
pub use store::{CatalogStore, Credentials, ReviewUpsert, StoreConfig};
