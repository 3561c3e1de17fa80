//! Authentication module.
//!
//! Users live in the store; bearer tokens are opaque random strings held in
//! memory until they expire or are revoked.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::domain::{AuthContext, User};
use crate::error::{Result, ServerError};
use crate::store::CourseStore;
use crate::utils::is_valid_password;

/// Default token lifetime (24 hours)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt. Output is `salt$hexdigest`.
fn hash_password_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{}${}", salt, hex(&hasher.finalize()))
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    hash_password_with_salt(password, &salt)
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, _)) => hash_password_with_salt(password, salt) == stored,
        None => false,
    }
}

/// Usernames: at least 2 characters of letters, digits, dashes and underscores
fn validate_username(username: &str) -> Result<()> {
    if username.chars().count() < 2 {
        return Err(ServerError::Validation(
            "username must be at least 2 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ServerError::Validation(
            "username can only contain letters, numbers, dashes, and underscores".to_string(),
        ));
    }
    Ok(())
}

/// An access token
#[derive(Clone, Debug)]
pub struct Token {
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub expires_at: SystemTime,
}

impl Token {
    pub fn new(user: &User, duration: Duration) -> Self {
        Self {
            token: generate_token(),
            user_id: user.id,
            username: user.username.clone(),
            expires_at: SystemTime::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }

    pub fn expires_at_secs(&self) -> u64 {
        self.expires_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn auth_context(&self) -> AuthContext {
        AuthContext::new(self.user_id, self.username.clone())
    }
}

/// Generate a random token
fn generate_token() -> String {
    let mut hasher = Sha256::new();
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    let result = hasher.finalize();
    BASE64.encode(&result[..24]) // 24 bytes = 32 base64 chars
}

/// Authentication manager
pub struct AuthManager {
    tokens: RwLock<HashMap<String, Token>>,
    token_duration: Duration,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::with_token_duration(DEFAULT_TOKEN_TTL)
    }

    pub fn with_token_duration(token_duration: Duration) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            token_duration,
        }
    }

    /// Create an account. The password must pass the strength rules.
    pub async fn register(&self, store: &dyn CourseStore, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        validate_username(username)?;
        if !is_valid_password(password) {
            return Err(ServerError::Validation(
                "password must be at least 8 characters and contain upper and lower case letters, a digit and a special character"
                    .to_string(),
            ));
        }

        let user = store.create_user(username, &hash_password(password)).await?;
        tracing::info!("Registered user {}", user.username);
        Ok(user)
    }

    /// Make sure a bootstrap account exists, without the strength rules.
    pub async fn ensure_user(&self, store: &dyn CourseStore, username: &str, password: &str) -> Result<User> {
        if let Some(user) = store.find_user_by_username(username).await? {
            return Ok(user);
        }
        let user = store.create_user(username, &hash_password(password)).await?;
        tracing::info!("Created bootstrap user {}", user.username);
        Ok(user)
    }

    /// Authenticate with username/password, returns a token
    pub async fn authenticate(&self, store: &dyn CourseStore, username: &str, password: &str) -> Result<Token> {
        let user = store
            .find_user_by_username(username)
            .await?
            .ok_or(ServerError::AuthFailed)?;

        if !verify_password(password, &user.password_hash) {
            tracing::debug!("Failed sign-in for {}", username);
            return Err(ServerError::AuthFailed);
        }

        let token = Token::new(&user, self.token_duration);
        self.cleanup_expired_tokens();
        self.tokens.write().insert(token.token.clone(), token.clone());

        Ok(token)
    }

    /// Validate a token and return the user info
    pub fn validate_token(&self, token_str: &str) -> Result<Token> {
        let tokens = self.tokens.read();
        let token = tokens.get(token_str).ok_or(ServerError::AuthFailed)?;

        if token.is_expired() {
            return Err(ServerError::AuthFailed);
        }

        Ok(token.clone())
    }

    /// Parse a `Bearer <token>` header and validate the token
    pub fn validate_bearer(&self, auth_header: &str) -> Result<Token> {
        let token_str = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ServerError::AuthFailed)?;
        self.validate_token(token_str.trim())
    }

    /// Cleanup expired tokens
    pub fn cleanup_expired_tokens(&self) {
        let mut tokens = self.tokens.write();
        tokens.retain(|_, t| !t.is_expired());
    }

    /// Revoke a token
    pub fn revoke_token(&self, token_str: &str) {
        self.tokens.write().remove(token_str);
    }

    /// Drop every token issued to a user
    pub fn revoke_user(&self, user_id: i32) {
        self.tokens.write().retain(|_, t| t.user_id != user_id);
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_password_hash() {
        let hash1 = hash_password("test123");
        let hash2 = hash_password("test123");

        // Salted: same password, different hashes, both verify
        assert_ne!(hash1, hash2);
        assert!(verify_password("test123", &hash1));
        assert!(verify_password("test123", &hash2));
        assert!(!verify_password("different", &hash1));
        assert!(!verify_password("test123", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_register_checks_password_strength() {
        let store = MemoryStore::new();
        let auth = AuthManager::new();

        assert!(matches!(
            auth.register(&store, "student", "password123").await,
            Err(ServerError::Validation(_))
        ));
        assert!(matches!(
            auth.register(&store, "x", "PassValid1!").await,
            Err(ServerError::Validation(_))
        ));
        assert!(matches!(
            auth.register(&store, "é", "PassValid1!").await,
            Err(ServerError::Validation(_))
        ));
        assert!(auth.register(&store, "zoë", "PassValid1!").await.is_ok());

        let user = auth.register(&store, "student", "PassValid1!").await.unwrap();
        assert_eq!(user.username, "student");
        assert!(verify_password("PassValid1!", &user.password_hash));
    }

    #[tokio::test]
    async fn test_auth_manager() {
        let store = MemoryStore::new();
        let auth = AuthManager::new();
        auth.register(&store, "teacher", "PassValid1!").await.unwrap();

        // Successful auth
        let token = auth.authenticate(&store, "teacher", "PassValid1!").await.unwrap();
        assert!(!token.is_expired());

        // Token validation
        let validated = auth.validate_token(&token.token).unwrap();
        assert_eq!(validated.username, "teacher");
        let header = format!("Bearer {}", token.token);
        assert_eq!(auth.validate_bearer(&header).unwrap().user_id, token.user_id);
        assert!(auth.validate_bearer(&token.token).is_err());

        // Failed auth
        assert!(auth.authenticate(&store, "teacher", "wrong").await.is_err());
        assert!(auth.authenticate(&store, "nonexistent", "pass").await.is_err());

        auth.revoke_token(&token.token);
        assert!(auth.validate_token(&token.token).is_err());
    }

    #[tokio::test]
    async fn test_expired_token() {
        let store = MemoryStore::new();
        let auth = AuthManager::with_token_duration(Duration::ZERO);
        auth.ensure_user(&store, "admin", "admin").await.unwrap();

        let token = auth.authenticate(&store, "admin", "admin").await.unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(auth.validate_token(&token.token).is_err());

        auth.cleanup_expired_tokens();
        assert!(auth.tokens.read().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_user_is_idempotent() {
        let store = MemoryStore::new();
        let auth = AuthManager::new();
        let first = auth.ensure_user(&store, "admin", "admin").await.unwrap();
        let second = auth.ensure_user(&store, "admin", "other").await.unwrap();
        assert_eq!(first.id, second.id);
    }
}
