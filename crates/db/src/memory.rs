use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, StoreError};
use crate::models::{Book, BookId, NewReview, NewUser, Review, ReviewId, User, UserId};
use crate::repository::CatalogRepository;

/// Process-local catalog keyed by id, with secondary indices for every
/// unique lookup. Ids are handed out sequentially and never reused, so id
/// order is insertion order.
#[derive(Debug)]
pub struct InMemoryCatalog {
    books: BTreeMap<BookId, Book>,
    isbn_index: HashMap<String, BookId>,
    users: BTreeMap<UserId, User>,
    username_index: HashMap<String, UserId>,
    email_index: HashMap<String, UserId>,
    reviews: BTreeMap<ReviewId, Review>,
    owner_index: HashMap<(BookId, UserId), ReviewId>,
    next_user_id: UserId,
    next_review_id: ReviewId,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            books: BTreeMap::new(),
            isbn_index: HashMap::new(),
            users: BTreeMap::new(),
            username_index: HashMap::new(),
            email_index: HashMap::new(),
            reviews: BTreeMap::new(),
            owner_index: HashMap::new(),
            next_user_id: 1,
            next_review_id: 1,
        }
    }

    /// Load a fixture book, keeping its id.
    pub fn load_book(&mut self, book: Book) -> Result<()> {
        if self.books.contains_key(&book.id) {
            return Err(StoreError::conflict(format!("duplicate book id {}", book.id)));
        }
        if self.isbn_index.contains_key(&book.isbn) {
            return Err(StoreError::conflict(format!("duplicate ISBN {}", book.isbn)));
        }
        self.isbn_index.insert(book.isbn.clone(), book.id);
        self.books.insert(book.id, book);
        Ok(())
    }

    /// Load a fixture user, keeping its id and hash.
    pub fn load_user(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(&user.id) {
            return Err(StoreError::conflict(format!("duplicate user id {}", user.id)));
        }
        self.ensure_identity_free(&user.username, &user.email)?;
        self.next_user_id = self.next_user_id.max(user.id + 1);
        self.index_user(&user);
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Load a fixture review, keeping its id and timestamps.
    pub fn load_review(&mut self, review: Review) -> Result<()> {
        if !self.books.contains_key(&review.book_id) {
            return Err(StoreError::not_found(format!(
                "review {} references unknown book {}",
                review.id, review.book_id
            )));
        }
        if self.reviews.contains_key(&review.id)
            || self
                .owner_index
                .contains_key(&(review.book_id, review.user_id))
        {
            return Err(StoreError::conflict(format!(
                "duplicate review {}",
                review.id
            )));
        }
        self.next_review_id = self.next_review_id.max(review.id + 1);
        self.owner_index
            .insert((review.book_id, review.user_id), review.id);
        self.reviews.insert(review.id, review);
        Ok(())
    }

    // Login accepts either identifier, so neither may collide with any
    // existing username or email.
    fn ensure_identity_free(&self, username: &str, email: &str) -> Result<()> {
        if self.identifier_taken(username) || self.identifier_taken(email) {
            return Err(StoreError::conflict("Username or email already exists"));
        }
        Ok(())
    }

    fn identifier_taken(&self, identifier: &str) -> bool {
        self.username_index.contains_key(identifier) || self.email_index.contains_key(identifier)
    }

    fn index_user(&mut self, user: &User) {
        self.username_index.insert(user.username.clone(), user.id);
        self.email_index.insert(user.email.clone(), user.id);
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn books(&self) -> Vec<Book> {
        self.books.values().cloned().collect()
    }

    fn book(&self, id: BookId) -> Option<Book> {
        self.books.get(&id).cloned()
    }

    fn book_by_isbn(&self, isbn: &str) -> Option<Book> {
        self.isbn_index
            .get(isbn)
            .and_then(|id| self.books.get(id))
            .cloned()
    }

    fn users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    fn user_by_username(&self, username: &str) -> Option<User> {
        self.username_index
            .get(username)
            .and_then(|id| self.users.get(id))
            .cloned()
    }

    fn user_by_email(&self, email: &str) -> Option<User> {
        self.email_index
            .get(email)
            .and_then(|id| self.users.get(id))
            .cloned()
    }

    fn insert_user(&mut self, user: NewUser) -> Result<User> {
        self.ensure_identity_free(&user.username, &user.email)?;

        let user = User {
            id: self.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: time::OffsetDateTime::now_utc(),
        };
        self.next_user_id += 1;
        self.index_user(&user);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn reviews(&self) -> Vec<Review> {
        self.reviews.values().cloned().collect()
    }

    fn reviews_for_book(&self, book_id: BookId) -> Vec<Review> {
        self.reviews
            .values()
            .filter(|review| review.book_id == book_id)
            .cloned()
            .collect()
    }

    fn review_by_owner(&self, book_id: BookId, user_id: UserId) -> Option<Review> {
        self.owner_index
            .get(&(book_id, user_id))
            .and_then(|id| self.reviews.get(id))
            .cloned()
    }

    fn insert_review(&mut self, review: NewReview) -> Result<Review> {
        let key = (review.book_id, review.user_id);
        if self.owner_index.contains_key(&key) {
            return Err(StoreError::conflict("Review already exists for this book"));
        }

        let review = Review {
            id: self.next_review_id,
            book_id: review.book_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: None,
        };
        self.next_review_id += 1;
        self.owner_index.insert(key, review.id);
        self.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    fn update_review(&mut self, review: Review) -> Option<Review> {
        let stored = self.reviews.get_mut(&review.id)?;
        stored.rating = review.rating;
        stored.comment = review.comment;
        stored.updated_at = review.updated_at;
        Some(stored.clone())
    }

    fn remove_review(&mut self, id: ReviewId) -> Option<Review> {
        let review = self.reviews.remove(&id)?;
        self.owner_index.remove(&(review.book_id, review.user_id));
        Some(review)
    }
}
