use crate::error::Result;
use crate::models::{Book, BookId, NewReview, NewUser, Review, ReviewId, User, UserId};

/// Storage seam behind [`crate::CatalogStore`].
///
/// Implementations own the collections and keep their uniqueness indices
/// consistent. Business rules (validation, hashing, ownership) stay in the
/// store, so a persistent backend only has to honour these contracts.
pub trait CatalogRepository: Send + Sync {
    /// All books in insertion order.
    fn books(&self) -> Vec<Book>;

    fn book(&self, id: BookId) -> Option<Book>;

    fn book_by_isbn(&self, isbn: &str) -> Option<Book>;

    /// All users in insertion order.
    fn users(&self) -> Vec<User>;

    fn user_by_username(&self, username: &str) -> Option<User>;

    fn user_by_email(&self, email: &str) -> Option<User>;

    /// Store a user under the next id. Fails with `Conflict` when the
    /// username or email is already taken.
    fn insert_user(&mut self, user: NewUser) -> Result<User>;

    /// Every review in the order it was first written.
    fn reviews(&self) -> Vec<Review>;

    /// Reviews of one book in the order they were first written.
    fn reviews_for_book(&self, book_id: BookId) -> Vec<Review>;

    /// The single review `user_id` has written for `book_id`, if any.
    fn review_by_owner(&self, book_id: BookId, user_id: UserId) -> Option<Review>;

    /// Store a review under the next id. Fails with `Conflict` when the
    /// owner already reviewed the book.
    fn insert_review(&mut self, review: NewReview) -> Result<Review>;

    /// Replace a review's mutable fields, returning the updated row.
    fn update_review(&mut self, review: Review) -> Option<Review>;

    fn remove_review(&mut self, id: ReviewId) -> Option<Review>;
}
