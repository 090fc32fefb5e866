use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use uuid::Uuid;

use domain_notifications::{messages, Mailer};

use crate::error::{AccountError, AccountResult};
use crate::models::{
    AdminUpdateUserRequest, ChangePasswordRequest, Page, RegisterRequest, UpdateProfileRequest,
    User, UserResponse,
};
use crate::repository::UserRepository;

/// Users per admin listing page
pub const PAGE_SIZE: u64 = 10;

/// Service layer for account business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    mailer: Arc<dyn Mailer>,
    /// Public base URL used to build verification links
    base_url: String,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            mailer: self.mailer.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, mailer: Arc<dyn Mailer>, base_url: String) -> Self {
        Self {
            repository: Arc::new(repository),
            mailer,
            base_url,
        }
    }

    /// Register a new account. The account starts unverified and a
    /// verification email is sent. Email delivery is best-effort: a
    /// transport failure is logged but does not fail the registration.
    pub async fn register(&self, input: RegisterRequest) -> AccountResult<UserResponse> {
        if input.password != input.password_confirm {
            return Err(AccountError::validation(
                "password_confirm",
                "Passwords do not match",
            ));
        }
        self.validate_password(&input.password)?;

        if self.repository.email_exists(&input.email).await? {
            return Err(AccountError::DuplicateEmail(input.email));
        }

        let password_hash = self.hash_password(&input.password)?;

        let user = User::new(
            input.email,
            input.username,
            input.first_name,
            input.last_name,
            password_hash,
            input.role,
        );

        let created = self.repository.create(user).await?;

        let body = messages::verification_email(
            &self.base_url,
            &created.full_name(),
            &created.verification_token.to_string(),
        );
        if let Err(e) = self
            .mailer
            .send(&created.email, messages::VERIFY_SUBJECT, &body)
            .await
        {
            tracing::warn!(
                user_id = %created.id,
                mailer = self.mailer.name(),
                error = %e,
                "Failed to send verification email"
            );
        }

        tracing::info!(user_id = %created.id, "Registered user");
        Ok(created.into())
    }

    /// Confirm an email address via its verification token. Confirming
    /// an already-verified account is a no-op that still succeeds; the
    /// token stays valid forever.
    pub async fn confirm_email(&self, token: Uuid) -> AccountResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_verification_token(token)
            .await?
            .ok_or(AccountError::TokenNotFound)?;

        if user.is_verified {
            return Ok(user.into());
        }

        user.is_verified = true;
        user.updated_at = chrono::Utc::now();
        let updated = self.repository.update(user).await?;

        tracing::info!(user_id = %updated.id, "Verified email");
        Ok(updated.into())
    }

    /// Check email/password and return the account. Deactivated
    /// accounts are rejected with the same error as a bad password.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> AccountResult<User> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AccountError::InvalidCredentials);
        }

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Load the full account record for a session principal. Returns
    /// None for sessions whose account has since been deleted.
    pub async fn load_principal(&self, id: Uuid) -> AccountResult<Option<User>> {
        self.repository.get_by_id(id).await
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: Uuid) -> AccountResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        Ok(user.into())
    }

    /// Self-service profile update for the given account
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileRequest,
    ) -> AccountResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_id(user_id)
            .await?
            .ok_or(AccountError::NotFound(user_id))?;

        if let Some(ref email) = input.email {
            if !email.eq_ignore_ascii_case(&user.email)
                && self.repository.email_exists(email).await?
            {
                return Err(AccountError::DuplicateEmail(email.clone()));
            }
        }

        user.apply_profile_update(input);
        let updated = self.repository.update(user).await?;

        Ok(updated.into())
    }

    /// Change the account's password. The current password must match;
    /// a mismatch is reported as a field error, not an auth failure,
    /// since the caller is already authenticated.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        input: ChangePasswordRequest,
    ) -> AccountResult<()> {
        let mut user = self
            .repository
            .get_by_id(user_id)
            .await?
            .ok_or(AccountError::NotFound(user_id))?;

        if !self.verify_password(&input.current_password, &user.password_hash)? {
            return Err(AccountError::validation(
                "current_password",
                "Current password is incorrect",
            ));
        }

        self.validate_password(&input.new_password)?;

        user.password_hash = self.hash_password(&input.new_password)?;
        user.updated_at = chrono::Utc::now();
        self.repository.update(user).await?;

        tracing::info!(user_id = %user_id, "Changed password");
        Ok(())
    }

    /// One page of the admin user listing, newest accounts first.
    /// Out-of-range page numbers are clamped instead of erroring, so
    /// the result always carries at least an empty first page.
    pub async fn admin_list_users(
        &self,
        principal: &User,
        page: i64,
    ) -> AccountResult<Page<UserResponse>> {
        self.require_privileged(principal)?;

        let total_items = self.repository.count().await?;
        let total_pages = std::cmp::max(1, total_items.div_ceil(PAGE_SIZE));

        let page = if page < 1 {
            1
        } else {
            std::cmp::min(page as u64, total_pages)
        };

        let offset = (page - 1) * PAGE_SIZE;
        let items = self.repository.list_page(offset, PAGE_SIZE).await?;

        Ok(Page {
            items: items.into_iter().map(UserResponse::from).collect(),
            page,
            page_size: PAGE_SIZE,
            total_items,
            total_pages,
        })
    }

    /// Admin view of a single account
    pub async fn admin_get_user(&self, principal: &User, id: Uuid) -> AccountResult<UserResponse> {
        self.require_privileged(principal)?;
        self.get_user(id).await
    }

    /// Administrative update of any account, including role and flags
    pub async fn admin_update_user(
        &self,
        principal: &User,
        id: Uuid,
        input: AdminUpdateUserRequest,
    ) -> AccountResult<UserResponse> {
        self.require_privileged(principal)?;

        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        if let Some(ref email) = input.email {
            if !email.eq_ignore_ascii_case(&user.email)
                && self.repository.email_exists(email).await?
            {
                return Err(AccountError::DuplicateEmail(email.clone()));
            }
        }

        user.apply_admin_update(input);
        let updated = self.repository.update(user).await?;

        tracing::info!(user_id = %id, admin_id = %principal.id, "Admin updated user");
        Ok(updated.into())
    }

    /// Delete an account
    pub async fn admin_delete_user(&self, principal: &User, id: Uuid) -> AccountResult<()> {
        self.require_privileged(principal)?;

        if !self.repository.delete(id).await? {
            return Err(AccountError::NotFound(id));
        }

        tracing::info!(user_id = %id, admin_id = %principal.id, "Admin deleted user");
        Ok(())
    }

    fn require_privileged(&self, principal: &User) -> AccountResult<()> {
        if principal.is_privileged() {
            Ok(())
        } else {
            Err(AccountError::Forbidden)
        }
    }

    fn hash_password(&self, password: &str) -> AccountResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AccountError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AccountResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AccountError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn validate_password(&self, password: &str) -> AccountResult<()> {
        if password.len() < 8 {
            return Err(AccountError::validation(
                "password",
                "Password must be at least 8 characters",
            ));
        }

        if password.len() > 128 {
            return Err(AccountError::validation(
                "password",
                "Password cannot exceed 128 characters",
            ));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AccountError::validation(
                "password",
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AccountError::validation(
                "password",
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_numeric()) {
            return Err(AccountError::validation(
                "password",
                "Password must contain at least one digit",
            ));
        }

        let special_chars = "!@#$%^&*()_+-=[]{}|;:,.<>?";
        if !password.chars().any(|c| special_chars.contains(c)) {
            return Err(AccountError::validation(
                "password",
                "Password must contain at least one special character",
            ));
        }

        Ok(())
    }
}
