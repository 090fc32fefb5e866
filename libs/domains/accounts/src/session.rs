use async_trait::async_trait;
use rand::{distr::Alphanumeric, RngExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AccountResult;

/// Name of the session cookie issued on login
pub const SESSION_COOKIE: &str = "session";

const SESSION_TOKEN_LEN: usize = 64;

/// Server-side session storage. Tokens are opaque random strings; the
/// store maps them to the authenticated user's id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for the user and return the new token
    async fn create(&self, user_id: Uuid) -> AccountResult<String>;

    /// Resolve a token to a user id, if the session exists
    async fn get(&self, token: &str) -> AccountResult<Option<Uuid>>;

    /// Remove a session; idempotent
    async fn remove(&self, token: &str) -> AccountResult<()>;

    /// Remove every session belonging to the user (logout everywhere,
    /// account deletion)
    async fn remove_for_user(&self, user_id: Uuid) -> AccountResult<()>;
}

/// In-memory implementation of SessionStore
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LEN)
            .map(char::from)
            .collect()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: Uuid) -> AccountResult<String> {
        let token = Self::generate_token();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), user_id);
        Ok(token)
    }

    async fn get(&self, token: &str) -> AccountResult<Option<Uuid>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).copied())
    }

    async fn remove(&self, token: &str) -> AccountResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        Ok(())
    }

    async fn remove_for_user(&self, user_id: Uuid) -> AccountResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, uid| *uid != user_id);
        Ok(())
    }
}

/// Extract a cookie value from a Cookie header
pub fn extract_cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_resolve_session() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::now_v7();

        let token = store.create(user_id).await.unwrap();
        assert_eq!(token.len(), SESSION_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        let resolved = store.get(&token).await.unwrap();
        assert_eq!(resolved, Some(user_id));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = InMemorySessionStore::new();
        let token = store.create(Uuid::now_v7()).await.unwrap();

        store.remove(&token).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), None);

        // Second removal is a no-op
        store.remove(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_for_user_clears_all_sessions() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::now_v7();
        let other_id = Uuid::now_v7();

        let first = store.create(user_id).await.unwrap();
        let second = store.create(user_id).await.unwrap();
        let other = store.create(other_id).await.unwrap();

        store.remove_for_user(user_id).await.unwrap();

        assert_eq!(store.get(&first).await.unwrap(), None);
        assert_eq!(store.get(&second).await.unwrap(), None);
        assert_eq!(store.get(&other).await.unwrap(), Some(other_id));
    }

    #[test]
    fn test_extract_cookie_value() {
        let header = "theme=dark; session=abc123; lang=en";
        assert_eq!(
            extract_cookie_value(header, "session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie_value(header, "missing"), None);
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = InMemorySessionStore::generate_token();
        let b = InMemorySessionStore::generate_token();
        assert_ne!(a, b);
    }
}
