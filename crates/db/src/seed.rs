//! Fixture data every process starts from.

use time::macros::datetime;

use crate::error::Result;
use crate::memory::InMemoryCatalog;
use crate::models::{Book, Review, User};

/// bcrypt (cost 10) of the string `password`.
pub const SEED_PASSWORD_HASH: &str =
    "$2a$10$92IXUNpkjO0rOQ5byMi.Ye4oKoEa3Ro9llC/.og/at2.uheWG/igi";

pub fn books() -> Vec<Book> {
    [
        (
            1,
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "978-0743273565",
            12.99,
            "A story of the fabulously wealthy Jay Gatsby and his love for the beautiful Daisy Buchanan.",
        ),
        (
            2,
            "To Kill a Mockingbird",
            "Harper Lee",
            "978-0446310789",
            14.99,
            "The story of young Scout Finch and her father Atticus in a racially divided Alabama town.",
        ),
        (
            3,
            "1984",
            "George Orwell",
            "978-0451524935",
            11.99,
            "A dystopian novel about totalitarianism and surveillance society.",
        ),
        (
            4,
            "Pride and Prejudice",
            "Jane Austen",
            "978-0141439518",
            9.99,
            "A romantic novel of manners that follows the emotional development of Elizabeth Bennet.",
        ),
        (
            5,
            "The Hobbit",
            "J.R.R. Tolkien",
            "978-0547928244",
            15.99,
            "A fantasy novel about Bilbo Baggins' journey with thirteen dwarves.",
        ),
    ]
    .into_iter()
    .map(|(id, title, author, isbn, price, description)| Book {
        id,
        title: title.to_string(),
        author: author.to_string(),
        isbn: isbn.to_string(),
        price,
        description: description.to_string(),
    })
    .collect()
}

pub fn users() -> Vec<User> {
    vec![User {
        id: 1,
        username: "john_doe".to_string(),
        email: "john@example.com".to_string(),
        password_hash: SEED_PASSWORD_HASH.to_string(),
        created_at: datetime!(2024-01-01 0:00 UTC),
    }]
}

pub fn reviews() -> Vec<Review> {
    vec![Review {
        id: 1,
        book_id: 1,
        user_id: 1,
        rating: 5,
        comment: "A masterpiece of American literature!".to_string(),
        created_at: datetime!(2024-01-15 10:30 UTC),
        updated_at: None,
    }]
}

/// A catalog holding the fixture books, users, and reviews.
pub fn seeded_catalog() -> Result<InMemoryCatalog> {
    let mut catalog = InMemoryCatalog::new();
    for book in books() {
        catalog.load_book(book)?;
    }
    for user in users() {
        catalog.load_user(user)?;
    }
    for review in reviews() {
        catalog.load_review(review)?;
    }
    Ok(catalog)
}
