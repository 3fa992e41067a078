use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified.
    pub sub: String,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn create_token(user_id: i64, username: &str) -> Result<String> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::days(CONFIG.jwt_expires_days))
        .ok_or_else(|| anyhow!("Failed to calculate token expiration"))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    let key = EncodingKey::from_secret(CONFIG.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| anyhow!("Failed to create token: {e}"))
}

pub fn verify_token(token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(CONFIG.jwt_secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| anyhow!("Invalid token: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let token = create_token(42, "alice").unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert!(verify_token("not-a-token").is_err());
        assert!(verify_token("").is_err());
    }
}
