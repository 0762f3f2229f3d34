//! Authentication primitives: salted password hashing and signed, time-limited
//! bearer tokens.

pub mod password;
pub mod token;

pub use password::PasswordError;
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};
