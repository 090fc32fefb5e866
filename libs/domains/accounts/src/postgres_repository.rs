use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::models::{Role, User};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    role: String,
    is_active: bool,
    is_superuser: bool,
    is_verified: bool,
    verification_token: Uuid,
    phone: Option<String>,
    bio: Option<String>,
    birth_date: Option<chrono::NaiveDate>,
    avatar_url: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            // Unknown role values fall back to the least-privileged role
            role: Role::from_str(&row.role).unwrap_or(Role::Regular),
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            is_verified: row.is_verified,
            verification_token: row.verification_token,
            phone: row.phone,
            bio: row.bio,
            birth_date: row.birth_date,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct ExistsRow {
    exists: bool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> AccountResult<User> {
        let sql = r#"
            INSERT INTO users (
                id, email, username, first_name, last_name, password_hash, role,
                is_active, is_superuser, is_verified, verification_token,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.username.clone().into(),
                user.first_name.clone().into(),
                user.last_name.clone().into(),
                user.password_hash.clone().into(),
                user.role.to_string().into(),
                user.is_active.into(),
                user.is_superuser.into(),
                user.is_verified.into(),
                user.verification_token.into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
                    AccountError::DuplicateEmail(user.email.clone())
                } else {
                    AccountError::Internal(format!("Database error: {}", e))
                }
            })?
            .ok_or_else(|| AccountError::Internal("Failed to create user".to_string()))?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> AccountResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE lower(email) = lower($1)";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_by_verification_token(&self, token: Uuid) -> AccountResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE verification_token = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [token.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_page(&self, offset: u64, limit: u64) -> AccountResult<Vec<User>> {
        let sql = "SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2";

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [(limit as i64).into(), (offset as i64).into()],
        );

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(|e| AccountError::Internal(format!("Database error: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn count(&self) -> AccountResult<u64> {
        let sql = "SELECT COUNT(*) AS count FROM users";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, []);

        let row = CountRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Internal(format!("Database error: {}", e)))?
            .ok_or_else(|| AccountError::Internal("Failed to count users".to_string()))?;

        Ok(row.count as u64)
    }

    async fn update(&self, user: User) -> AccountResult<User> {
        let sql = r#"
            UPDATE users
            SET email = $2, username = $3, first_name = $4, last_name = $5,
                password_hash = $6, role = $7, is_active = $8, is_superuser = $9,
                is_verified = $10, phone = $11, bio = $12, birth_date = $13,
                avatar_url = $14, updated_at = $15
            WHERE id = $1
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.username.clone().into(),
                user.first_name.clone().into(),
                user.last_name.clone().into(),
                user.password_hash.clone().into(),
                user.role.to_string().into(),
                user.is_active.into(),
                user.is_superuser.into(),
                user.is_verified.into(),
                user.phone.clone().into(),
                user.bio.clone().into(),
                user.birth_date.into(),
                user.avatar_url.clone().into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
                    AccountError::DuplicateEmail(user.email.clone())
                } else {
                    AccountError::Internal(format!("Database error: {}", e))
                }
            })?;

        row.map(|r| r.into()).ok_or(AccountError::NotFound(user.id))
    }

    async fn delete(&self, id: Uuid) -> AccountResult<bool> {
        let sql = "DELETE FROM users WHERE id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let result = self
            .db
            .execute_raw(stmt)
            .await
            .map_err(|e| AccountError::Internal(format!("Database error: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn email_exists(&self, email: &str) -> AccountResult<bool> {
        let sql = "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1)) AS exists";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = ExistsRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Internal(format!("Database error: {}", e)))?
            .ok_or_else(|| AccountError::Internal("Failed to check email".to_string()))?;

        Ok(row.exists)
    }
}
