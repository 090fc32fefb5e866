use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::models::User;

/// Repository trait for User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. The store's unique email constraint is the
    /// authority on duplicates; implementations map a violation to
    /// [`AccountError::DuplicateEmail`].
    async fn create(&self, user: User) -> AccountResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> AccountResult<Option<User>>;

    /// Get a user by email
    async fn get_by_email(&self, email: &str) -> AccountResult<Option<User>>;

    /// Get the user holding this verification token (exact match)
    async fn get_by_verification_token(&self, token: Uuid) -> AccountResult<Option<User>>;

    /// One page of users ordered by creation time, descending
    async fn list_page(&self, offset: u64, limit: u64) -> AccountResult<Vec<User>>;

    /// Total number of users
    async fn count(&self) -> AccountResult<u64>;

    /// Update an existing user
    async fn update(&self, user: User) -> AccountResult<User>;

    /// Delete a user by ID; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> AccountResult<bool>;

    /// Check if an email already exists
    async fn email_exists(&self, email: &str) -> AccountResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AccountResult<User> {
        let mut users = self.users.write().await;

        let email_exists = users
            .values()
            .any(|u| u.email.to_lowercase() == user.email.to_lowercase());

        if email_exists {
            return Err(AccountError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> AccountResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned();
        Ok(user)
    }

    async fn get_by_verification_token(&self, token: Uuid) -> AccountResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.verification_token == token)
            .cloned();
        Ok(user)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> AccountResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();

        // Newest first; id (uuid v7) as tiebreaker for same-instant rows
        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let result: Vec<User> = result
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok(result)
    }

    async fn count(&self) -> AccountResult<u64> {
        let users = self.users.read().await;
        Ok(users.len() as u64)
    }

    async fn update(&self, user: User) -> AccountResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(AccountError::NotFound(user.id));
        }

        // Duplicate email check, excluding the user being updated
        let email_exists = users
            .values()
            .any(|u| u.id != user.id && u.email.to_lowercase() == user.email.to_lowercase());

        if email_exists {
            return Err(AccountError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AccountResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn email_exists(&self, email: &str) -> AccountResult<bool> {
        let users = self.users.read().await;
        let exists = users
            .values()
            .any(|u| u.email.to_lowercase() == email.to_lowercase());
        Ok(exists)
    }
}
