use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::anyhow;
use bookshop_authz::{password, TokenIssuer};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::{Result, StoreError};
use crate::models::{Book, BookId, NewReview, NewUser, Review, User, UserId, UserProfile};
use crate::repository::CatalogRepository;
use crate::seed;

const DUPLICATE_USER: &str = "Username or email already exists";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const MIN_PASSWORD_LEN: usize = 6;

/// Knobs for the store's crypto.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub bcrypt_cost: u32,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

/// What a successful login hands back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub user: UserProfile,
}

/// Outcome of [`CatalogStore::upsert_review`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewUpsert {
    Created(Review),
    Updated(Review),
}

impl ReviewUpsert {
    pub fn into_review(self) -> Review {
        match self {
            ReviewUpsert::Created(review) | ReviewUpsert::Updated(review) => review,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, ReviewUpsert::Created(_))
    }
}

/// The catalog and the rules for touching it.
///
/// Each operation holds the repository lock for its whole read-modify-write
/// and never across an `.await`; password hashing happens with the lock
/// released and the insert re-checks uniqueness.
pub struct CatalogStore {
    repo: RwLock<Box<dyn CatalogRepository>>,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl CatalogStore {
    pub fn new(repo: impl CatalogRepository + 'static, config: &StoreConfig) -> Self {
        Self {
            repo: RwLock::new(Box::new(repo)),
            tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// A store holding the fixture catalog.
    pub fn seeded(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(seed::seeded_catalog()?, config))
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    // Writes never leave the repository half-applied, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Box<dyn CatalogRepository>> {
        self.repo.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Box<dyn CatalogRepository>> {
        self.repo.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list_books(&self) -> Vec<Book> {
        self.read().books()
    }

    pub fn find_book(&self, id: BookId) -> Result<Book> {
        self.read()
            .book(id)
            .ok_or_else(|| StoreError::not_found("Book not found"))
    }

    pub fn find_book_by_isbn(&self, isbn: &str) -> Result<Book> {
        self.read()
            .book_by_isbn(isbn)
            .ok_or_else(|| StoreError::not_found("Book not found with this ISBN"))
    }

    /// Books whose author contains `needle`, ignoring case.
    pub fn find_books_by_author(&self, needle: &str) -> Result<Vec<Book>> {
        let matches = self.search(needle, |book| &book.author);
        if matches.is_empty() {
            return Err(StoreError::not_found("No books found for this author"));
        }
        Ok(matches)
    }

    /// Books whose title contains `needle`, ignoring case.
    pub fn find_books_by_title(&self, needle: &str) -> Result<Vec<Book>> {
        let matches = self.search(needle, |book| &book.title);
        if matches.is_empty() {
            return Err(StoreError::not_found("No books found with this title"));
        }
        Ok(matches)
    }

    fn search(&self, needle: &str, field: impl Fn(&Book) -> &String) -> Vec<Book> {
        let needle = needle.to_lowercase();
        self.read()
            .books()
            .into_iter()
            .filter(|book| field(book).to_lowercase().contains(&needle))
            .collect()
    }

    /// Reviews for a book; empty when there are none.
    pub fn list_reviews(&self, book_id: BookId) -> Vec<Review> {
        self.read().reviews_for_book(book_id)
    }

    /// Reviews across the whole catalog, oldest first.
    pub fn list_all_reviews(&self) -> Vec<Review> {
        self.read().reviews()
    }

    pub fn list_users(&self) -> Vec<UserProfile> {
        self.read().users().iter().map(UserProfile::from).collect()
    }

    /// Create an account. The password is stored only as a bcrypt hash.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile> {
        validate_registration(username, email, password)?;
        // Fail fast before paying for a hash; the insert checks again.
        self.ensure_unregistered(username, email)?;

        let password_hash = password::hash_password(password, self.bcrypt_cost).await?;

        let user = self.write().insert_user(NewUser {
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash,
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(UserProfile::from(&user))
    }

    fn ensure_unregistered(&self, username: &str, email: &str) -> Result<()> {
        let repo = self.read();
        let taken = |identifier: &str| {
            repo.user_by_username(identifier).is_some() || repo.user_by_email(identifier).is_some()
        };
        if taken(username) || taken(email) {
            return Err(StoreError::conflict(DUPLICATE_USER));
        }
        Ok(())
    }

    /// Check a password and issue a bearer token.
    ///
    /// `login` may be either the username or the email, matched exactly.
    /// Unknown users and wrong passwords fail identically.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<Credentials> {
        if login.is_empty() || password.is_empty() {
            return Err(StoreError::invalid("Username and password are required"));
        }

        let Some(user) = self.user_by_login(login) else {
            tracing::debug!("login rejected: unknown account");
            return Err(StoreError::Unauthorized);
        };

        if !password::verify_password(password, &user.password_hash).await? {
            tracing::debug!(user_id = user.id, "login rejected: password mismatch");
            return Err(StoreError::Unauthorized);
        }

        let issued = self.tokens.issue(user.id, &user.username, &user.email)?;
        tracing::info!(user_id = user.id, "login succeeded");

        Ok(Credentials {
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
            user: UserProfile::from(&user),
        })
    }

    fn user_by_login(&self, login: &str) -> Option<User> {
        let repo = self.read();
        repo.user_by_username(login)
            .or_else(|| repo.user_by_email(login))
    }

    /// Write `user_id`'s review of `book_id`, replacing any earlier one.
    pub fn upsert_review(
        &self,
        book_id: BookId,
        user_id: UserId,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewUpsert> {
        let mut repo = self.write();
        if repo.book(book_id).is_none() {
            return Err(StoreError::not_found("Book not found"));
        }

        let rating = u8::try_from(rating)
            .ok()
            .filter(|rating| (1..=5).contains(rating))
            .ok_or_else(|| StoreError::invalid("Rating must be between 1 and 5"))?;
        if comment.trim().is_empty() {
            return Err(StoreError::invalid("Comment must not be empty"));
        }

        let now = OffsetDateTime::now_utc();
        match repo.review_by_owner(book_id, user_id) {
            Some(mut review) => {
                review.rating = rating;
                review.comment = comment.to_owned();
                review.updated_at = Some(now);
                let review = repo.update_review(review).ok_or_else(|| {
                    StoreError::Internal(anyhow!("review vanished while being updated"))
                })?;
                tracing::info!(review_id = review.id, book_id, user_id, "review updated");
                Ok(ReviewUpsert::Updated(review))
            }
            None => {
                let review = repo.insert_review(NewReview {
                    book_id,
                    user_id,
                    rating,
                    comment: comment.to_owned(),
                    created_at: now,
                })?;
                tracing::info!(review_id = review.id, book_id, user_id, "review created");
                Ok(ReviewUpsert::Created(review))
            }
        }
    }

    /// Remove `user_id`'s review of `book_id`. Other users' reviews are
    /// invisible here, so they report as not found.
    pub fn delete_review(&self, book_id: BookId, user_id: UserId) -> Result<Review> {
        let mut repo = self.write();
        if repo.book(book_id).is_none() {
            return Err(StoreError::not_found("Book not found"));
        }

        let removed = repo
            .review_by_owner(book_id, user_id)
            .and_then(|review| repo.remove_review(review.id))
            .ok_or_else(|| {
                StoreError::not_found("Review not found or you are not authorized to delete it")
            })?;

        tracing::info!(review_id = removed.id, book_id, user_id, "review deleted");
        Ok(removed)
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err(StoreError::invalid(
            "Username, email, and password are required",
        ));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(StoreError::invalid("Invalid email format"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StoreError::invalid(
            "Password must be at least 6 characters long",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCatalog;

    fn config() -> StoreConfig {
        StoreConfig {
            bcrypt_cost: 4,
            jwt_secret: "test-secret".into(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }

    fn store() -> CatalogStore {
        CatalogStore::seeded(&config()).unwrap()
    }

    #[test]
    fn every_seeded_isbn_resolves_to_its_book() {
        let store = store();
        for book in seed::books() {
            assert_eq!(store.find_book_by_isbn(&book.isbn).unwrap(), book);
        }
    }

    #[test]
    fn isbn_lookup_scenario() {
        let store = store();
        let gatsby = store.find_book_by_isbn("978-0743273565").unwrap();
        assert_eq!(gatsby.title, "The Great Gatsby");
        assert_eq!(gatsby.id, 1);

        let err = store.find_book_by_isbn("000-0000000000").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn list_books_keeps_insertion_order() {
        let titles: Vec<_> = store()
            .list_books()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "The Great Gatsby",
                "To Kill a Mockingbird",
                "1984",
                "Pride and Prejudice",
                "The Hobbit",
            ]
        );
    }

    #[test]
    fn author_search_ignores_case() {
        let store = store();
        let lower = store.find_books_by_author("fitzgerald").unwrap();
        let upper = store.find_books_by_author("FITZGERALD").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].author, "F. Scott Fitzgerald");
    }

    #[test]
    fn title_search_matches_substrings() {
        let store = store();
        let found = store.find_books_by_title("the").unwrap();
        let titles: Vec<_> = found.iter().map(|book| book.title.as_str()).collect();
        assert_eq!(titles, vec!["The Great Gatsby", "The Hobbit"]);
    }

    #[test]
    fn empty_search_results_are_not_found() {
        let store = store();
        assert!(matches!(
            store.find_books_by_author("Dickens"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.find_books_by_title("Moby"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn reviews_for_unreviewed_book_are_empty() {
        let store = store();
        assert_eq!(store.list_reviews(1).len(), 1);
        assert!(store.list_reviews(3).is_empty());
        assert!(store.list_reviews(404).is_empty());
    }

    #[test]
    fn all_reviews_span_every_book_in_id_order() {
        let store = store();
        assert_eq!(store.list_all_reviews().len(), 1);

        store.upsert_review(3, 1, 4, "chilling").unwrap();
        store.upsert_review(2, 1, 5, "timeless").unwrap();

        let all = store.list_all_reviews();
        let ids: Vec<_> = all.iter().map(|review| review.id).collect();
        let books: Vec<_> = all.iter().map(|review| review.book_id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(books, [1, 3, 2]);

        store.delete_review(1, 1).unwrap();
        assert_eq!(store.list_all_reviews().len(), 2);
    }

    #[test]
    fn upsert_twice_keeps_one_review_with_latest_values() {
        let store = store();
        let first = store.upsert_review(2, 1, 5, "x").unwrap();
        assert!(first.is_created());
        let first = first.into_review();

        let second = store.upsert_review(2, 1, 3, "second thoughts").unwrap();
        assert!(!second.is_created());
        assert_eq!(second.into_review().id, first.id);

        let reviews = store.list_reviews(2);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 3);
        assert_eq!(reviews[0].comment, "second thoughts");
        assert!(reviews[0].updated_at.is_some());
        assert_eq!(reviews[0].created_at, first.created_at);
    }

    #[test]
    fn upsert_on_seeded_review_updates_in_place() {
        let store = store();
        let outcome = store.upsert_review(1, 1, 5, "x").unwrap();
        let again = store.upsert_review(1, 1, 5, "x").unwrap();

        let ReviewUpsert::Updated(updated) = outcome else {
            panic!("expected the seeded review to be updated");
        };
        assert_eq!(updated.id, 1);
        assert_eq!(again.into_review().id, 1);
        assert_eq!(store.list_reviews(1).len(), 1);
    }

    #[test]
    fn upsert_rejects_unknown_book_and_bad_input() {
        let store = store();
        assert!(matches!(
            store.upsert_review(99, 1, 5, "x"),
            Err(StoreError::NotFound(_))
        ));
        for rating in [0, 6, -1, 300] {
            assert!(matches!(
                store.upsert_review(1, 1, rating, "x"),
                Err(StoreError::InvalidInput(_))
            ));
        }
        assert!(matches!(
            store.upsert_review(1, 1, 4, "   "),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(store.list_reviews(1)[0].comment, "A masterpiece of American literature!");
    }

    #[test]
    fn delete_is_scoped_to_the_owner() {
        let store = store();
        let err = store.delete_review(1, 2).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.list_reviews(1).len(), 1);

        let removed = store.delete_review(1, 1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(store.list_reviews(1).is_empty());
        assert!(matches!(
            store.delete_review(1, 1),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn delete_on_unknown_book_is_not_found() {
        assert!(matches!(
            store().delete_review(42, 1),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn deleted_review_ids_are_not_reused() {
        let store = store();
        store.delete_review(1, 1).unwrap();
        let recreated = store.upsert_review(1, 1, 4, "rereading it").unwrap();
        assert!(recreated.is_created());
        assert_eq!(recreated.into_review().id, 2);
    }

    #[tokio::test]
    async fn register_returns_profile_and_rejects_duplicates() {
        let store = store();
        let alice = store
            .register_user("alice", "alice@x.com", "secret1")
            .await
            .unwrap();
        assert_eq!(alice.id, 2);
        assert_eq!(alice.username, "alice");

        let json = serde_json::to_string(&alice).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret1"));

        let err = store
            .register_user("alice", "different@x.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store
            .register_user("bob", "alice@x.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_users().len(), 2);
    }

    #[tokio::test]
    async fn username_cannot_claim_another_users_email() {
        let store = store();
        let err = store
            .register_user("john@example.com", "mallory@x.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store
            .register_user("eve@x.com", "eve@mail.com", "secret1")
            .await
            .unwrap();
        let err = store
            .register_user("mallory", "eve@x.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_users().len(), 2);

        let credentials = store
            .authenticate("john@example.com", "password")
            .await
            .unwrap();
        assert_eq!(credentials.user.id, 1);
    }

    #[tokio::test]
    async fn register_validates_input() {
        let store = store();
        for (username, email, password) in [
            ("", "a@x.com", "secret1"),
            ("alice", "", "secret1"),
            ("alice", "a@x.com", ""),
            ("alice", "not-an-email", "secret1"),
            ("alice", "a @x.com", "secret1"),
            ("alice", "a@x.com", "short"),
        ] {
            let err = store
                .register_user(username, email, password)
                .await
                .unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidInput(_)),
                "{username}/{email}/{password} should be invalid"
            );
        }
        assert_eq!(store.list_users().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_duplicate_registration_creates_one_user() {
        let store = std::sync::Arc::new(store());
        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.register_user("carol", "c1@x.com", "secret1").await })
        };
        let second = {
            let store = store.clone();
            tokio::spawn(async move { store.register_user("carol", "c2@x.com", "secret1").await })
        };

        let outcomes = [first.await.unwrap(), second.await.unwrap()];
        let created = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Err(StoreError::Conflict(_))))
            .count();

        assert_eq!(created, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(
            store
                .list_users()
                .iter()
                .filter(|user| user.username == "carol")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn seeded_user_can_log_in_by_username_or_email() {
        let store = store();
        let by_name = store.authenticate("john_doe", "password").await.unwrap();
        assert_eq!(by_name.user.id, 1);
        assert_eq!(by_name.token_type, "Bearer");
        assert_eq!(by_name.expires_in, 86_400);

        let claims = store.tokens().verify(&by_name.token).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "john_doe");

        let by_email = store
            .authenticate("john@example.com", "password")
            .await
            .unwrap();
        assert_eq!(by_email.user.username, "john_doe");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let store = store();
        let wrong_password = store
            .authenticate("john_doe", "not-the-password")
            .await
            .unwrap_err();
        let unknown_user = store.authenticate("nobody", "password").await.unwrap_err();

        assert!(matches!(wrong_password, StoreError::Unauthorized));
        assert!(matches!(unknown_user, StoreError::Unauthorized));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn login_is_case_sensitive_and_requires_both_fields() {
        let store = store();
        assert!(matches!(
            store.authenticate("JOHN_DOE", "password").await,
            Err(StoreError::Unauthorized)
        ));
        assert!(matches!(
            store.authenticate("john_doe", "").await,
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn registered_user_can_log_in() {
        let store = store();
        store
            .register_user("alice", "alice@x.com", "secret1")
            .await
            .unwrap();
        let credentials = store.authenticate("alice", "secret1").await.unwrap();
        assert_eq!(credentials.user.username, "alice");
    }

    #[test]
    fn empty_repository_works_behind_the_store() {
        let store = CatalogStore::new(InMemoryCatalog::new(), &config());
        assert!(store.list_books().is_empty());
        assert!(store.list_users().is_empty());
        assert!(matches!(
            store.upsert_review(1, 1, 5, "x"),
            Err(StoreError::NotFound(_))
        ));
    }
}
