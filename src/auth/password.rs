use anyhow::{anyhow, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

pub fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).map_err(|e| anyhow!("Failed to hash password: {e}"))
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool> {
    verify(password, hashed).map_err(|e| anyhow!("Failed to verify password: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_the_original_password() {
        let hashed = hash_password("s3cret").unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(verify_password("s3cret", &hashed).unwrap());
    }

    #[test]
    fn rejects_a_wrong_password() {
        let hashed = hash_password("s3cret").unwrap();
        assert!(!verify_password("wrong", &hashed).unwrap());
    }
}
