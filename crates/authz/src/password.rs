//! bcrypt hashing, run off the async executor.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash `password` with a fresh salt at the given bcrypt cost.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Compare `password` against a stored bcrypt hash.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheapest cost bcrypt accepts; keeps the suite fast.
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_is_salted_and_verifiable() {
        let first = hash_password("secret1", TEST_COST).await.unwrap();
        let second = hash_password("secret1", TEST_COST).await.unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("secret1"));
        assert!(verify_password("secret1", &first).await.unwrap());
        assert!(verify_password("secret1", &second).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_does_not_verify() {
        let hash = hash_password("secret1", TEST_COST).await.unwrap();
        assert!(!verify_password("secret2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hash_records_requested_cost() {
        let hash = hash_password("secret1", 5).await.unwrap();
        assert!(hash.starts_with("$2b$05$"));
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let result = verify_password("secret1", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(PasswordError::Hash(_))));
    }
}
