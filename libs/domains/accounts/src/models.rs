use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Account roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Regular,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Regular => write!(f, "regular"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Role::Regular),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// User entity - matches the SQL schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Email (unique, used as the login key)
    pub email: String,
    /// Username (display handle, not the login key)
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// Deactivated accounts cannot log in
    pub is_active: bool,
    /// Superusers pass the role gate regardless of role
    pub is_superuser: bool,
    /// Whether the email address has been verified
    pub is_verified: bool,
    /// Opaque verification token, generated once at creation. Immutable;
    /// never rotated, even on re-verification.
    pub verification_token: Uuid,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified account with a fresh verification token
    /// (password must already be hashed by the service layer).
    pub fn new(
        email: String,
        username: String,
        first_name: String,
        last_name: String,
        password_hash: String,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email,
            username,
            first_name,
            last_name,
            password_hash,
            role,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            verification_token: Uuid::new_v4(),
            phone: None,
            bio: None,
            birth_date: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// "First Last", trimmed; empty when both names are empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// The role gate: admins and superusers may perform administrative
    /// mutations.
    pub fn is_privileged(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    /// Apply a self-service profile update. Role and the active/verified
    /// flags are not reachable through this path.
    pub fn apply_profile_update(&mut self, update: UpdateProfileRequest) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(avatar_url) = update.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
        self.updated_at = Utc::now();
    }

    /// Apply an administrative update. Admins may change any field,
    /// including role and the active/verified flags.
    pub fn apply_admin_update(&mut self, update: AdminUpdateUserRequest) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(is_verified) = update.is_verified {
            self.is_verified = is_verified;
        }
        self.updated_at = Utc::now();
    }
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_active: user.is_active,
            is_verified: user.is_verified,
            phone: user.phone,
            bio: user.bio,
            birth_date: user.birth_date,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for registration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1, max = 30))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30))]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    pub password: String,
    /// Must match `password`; checked by the service
    pub password_confirm: String,
}

/// DTO for self-service profile updates
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub last_name: Option<String>,
    #[validate(length(max = 15))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub avatar_url: Option<String>,
}

/// DTO for administrative updates
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

/// DTO for password changes
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// DTO for login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned (after clamping)
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "test@example.com".to_string(),
            "testuser".to_string(),
            "Test".to_string(),
            "User".to_string(),
            "hashed".to_string(),
            Role::Regular,
        )
    }

    #[test]
    fn test_new_user_is_unverified_with_token() {
        let user = test_user();
        assert!(!user.is_verified);
        assert!(user.is_active);
        assert!(!user.verification_token.is_nil());
    }

    #[test]
    fn test_full_name() {
        let user = test_user();
        assert_eq!(user.full_name(), "Test User");

        let mut no_name = test_user();
        no_name.first_name = String::new();
        no_name.last_name = String::new();
        assert_eq!(no_name.full_name(), "");
    }

    #[test]
    fn test_is_privileged() {
        let regular = test_user();
        assert!(!regular.is_privileged());

        let mut admin = test_user();
        admin.role = Role::Admin;
        assert!(admin.is_privileged());

        let mut superuser = test_user();
        superuser.is_superuser = true;
        assert!(superuser.is_privileged());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Regular".parse::<Role>().unwrap(), Role::Regular);
        assert!("moderator".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_profile_update_cannot_touch_privileges() {
        let mut user = test_user();
        user.apply_profile_update(UpdateProfileRequest {
            first_name: Some("Updated".to_string()),
            bio: Some("New bio".to_string()),
            ..Default::default()
        });

        assert_eq!(user.first_name, "Updated");
        assert_eq!(user.bio.as_deref(), Some("New bio"));
        assert_eq!(user.role, Role::Regular);
        assert!(!user.is_verified);
    }

    #[test]
    fn test_admin_update_changes_flags() {
        let mut user = test_user();
        user.apply_admin_update(AdminUpdateUserRequest {
            role: Some(Role::Admin),
            is_verified: Some(true),
            is_active: Some(false),
            ..Default::default()
        });

        assert_eq!(user.role, Role::Admin);
        assert!(user.is_verified);
        assert!(!user.is_active);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = test_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
