use crate::errors::{AppError, AppResult};

/// bcrypt work factor for stored passwords.
pub const HASH_COST: u32 = 10;

/// Salts and hashes a plaintext password for storage.
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, HASH_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to hash password: {e}")))
}

/// Checks a candidate against a stored hash. A mismatch is `false`, not an error.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(candidate, stored_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            false
        }
    }
}

/// `hash_password` off the async executor; bcrypt is deliberately slow.
pub async fn hash(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hashing task failed: {e}")))?
}

/// `verify_password` off the async executor.
pub async fn verify(candidate: String, stored_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("verification task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_does_not_match() {
        assert!(!verify_password("secret1", "not-a-bcrypt-hash"));
    }

    #[tokio::test]
    async fn async_wrappers_agree() {
        let hash = hash("secret1".to_string()).await.unwrap();
        assert!(verify("secret1".to_string(), hash.clone()).await.unwrap());
        assert!(!verify("nope".to_string(), hash).await.unwrap());
    }
}
