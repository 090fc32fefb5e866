use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::ValidatedJson;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::models::{
    AdminUpdateUserRequest, ChangePasswordRequest, LoginRequest, Page, RegisterRequest,
    UpdateProfileRequest, User, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;
use crate::session::{extract_cookie_value, SessionStore, SESSION_COOKIE};

/// Shared handler state: the service, the session store, and whether
/// issued cookies carry the Secure attribute.
pub struct AccountsState<R: UserRepository> {
    service: UserService<R>,
    sessions: Arc<dyn SessionStore>,
    secure_cookies: bool,
}

impl<R: UserRepository> Clone for AccountsState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            sessions: self.sessions.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

/// Create the accounts router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(
    service: UserService<R>,
    sessions: impl SessionStore + 'static,
    secure_cookies: bool,
) -> Router {
    let state = AccountsState {
        service,
        sessions: Arc::new(sessions),
        secure_cookies,
    };

    Router::new()
        .route("/register", post(register))
        .route("/verify/{token}", get(verify))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route("/admin/users", get(admin_list_users))
        .route(
            "/admin/users/{id}",
            get(admin_get_user)
                .put(admin_update_user)
                .delete(admin_delete_user),
        )
        .with_state(state)
}

/// Resolve the session cookie to the full account record. Missing or
/// stale sessions and deactivated accounts all map to Unauthorized.
async fn current_user<R: UserRepository>(
    state: &AccountsState<R>,
    headers: &axum::http::HeaderMap,
) -> AccountResult<User> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(AccountError::Unauthorized)?;

    let token =
        extract_cookie_value(cookie_header, SESSION_COOKIE).ok_or(AccountError::Unauthorized)?;

    let user_id = state
        .sessions
        .get(&token)
        .await?
        .ok_or(AccountError::Unauthorized)?;

    let user = state
        .service
        .load_principal(user_id)
        .await?
        .ok_or(AccountError::Unauthorized)?;

    if !user.is_active {
        return Err(AccountError::Unauthorized);
    }

    Ok(user)
}

fn session_cookie(token: &str, secure: bool) -> AccountResult<HeaderValue> {
    let secure_flag = if secure { " Secure;" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly;{} SameSite=Strict; Path=/",
        SESSION_COOKIE, token, secure_flag
    );

    HeaderValue::from_str(&cookie)
        .map_err(|e| AccountError::Internal(format!("Failed to create cookie: {}", e)))
}

fn expired_session_cookie(secure: bool) -> AccountResult<HeaderValue> {
    let secure_flag = if secure { " Secure;" } else { "" };
    let cookie = format!(
        "{}=; HttpOnly;{} SameSite=Strict; Path=/; Max-Age=0",
        SESSION_COOKIE, secure_flag
    );

    HeaderValue::from_str(&cookie)
        .map_err(|e| AccountError::Internal(format!("Failed to create cookie: {}", e)))
}

/// Register a new account
///
/// POST /register
async fn register<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AccountResult<impl IntoResponse> {
    let user = state.service.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Confirm an email address via its verification token
///
/// GET /verify/:token
async fn verify<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    Path(token): Path<Uuid>,
) -> AccountResult<Json<UserResponse>> {
    let user = state.service.confirm_email(token).await?;
    Ok(Json(user))
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    user: UserResponse,
}

/// Login with email/password; issues the session cookie
///
/// POST /login
async fn login<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Response, AccountError> {
    let user = state
        .service
        .verify_credentials(&input.email, &input.password)
        .await?;

    let token = state.sessions.create(user.id).await?;
    let cookie = session_cookie(&token, state.secure_cookies)?;

    tracing::info!(user_id = %user.id, "Logged in");

    let response = LoginResponse { user: user.into() };

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(response),
    )
        .into_response())
}

/// Logout; removes the session and expires the cookie. Succeeds even
/// without a valid session.
///
/// POST /logout
async fn logout<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
) -> Result<Response, AccountError> {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| extract_cookie_value(h, SESSION_COOKIE))
    {
        state.sessions.remove(&token).await?;
    }

    let cookie = expired_session_cookie(state.secure_cookies)?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
    )
        .into_response())
}

/// Get the authenticated account's profile
///
/// GET /profile
async fn get_profile<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
) -> AccountResult<Json<UserResponse>> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(user.into()))
}

/// Self-service profile update
///
/// PUT /profile
async fn update_profile<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
    ValidatedJson(input): ValidatedJson<UpdateProfileRequest>,
) -> AccountResult<Json<UserResponse>> {
    let user = current_user(&state, &headers).await?;
    let updated = state.service.update_profile(user.id, input).await?;
    Ok(Json(updated))
}

/// Change the authenticated account's password
///
/// POST /change-password
async fn change_password<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> AccountResult<StatusCode> {
    let user = current_user(&state, &headers).await?;
    state.service.change_password(user.id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<i64>,
}

/// Paginated admin user listing
///
/// GET /admin/users?page=2
async fn admin_list_users<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
    Query(query): Query<PageQuery>,
) -> AccountResult<Json<Page<UserResponse>>> {
    let principal = current_user(&state, &headers).await?;
    let page = state
        .service
        .admin_list_users(&principal, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// Admin view of a single account
///
/// GET /admin/users/:id
async fn admin_get_user<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
    Path(id): Path<Uuid>,
) -> AccountResult<Json<UserResponse>> {
    let principal = current_user(&state, &headers).await?;
    let user = state.service.admin_get_user(&principal, id).await?;
    Ok(Json(user))
}

/// Administrative update of any account
///
/// PUT /admin/users/:id
async fn admin_update_user<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<AdminUpdateUserRequest>,
) -> AccountResult<Json<UserResponse>> {
    let principal = current_user(&state, &headers).await?;
    let user = state.service.admin_update_user(&principal, id, input).await?;
    Ok(Json(user))
}

/// Delete an account; also drops its sessions
///
/// DELETE /admin/users/:id
async fn admin_delete_user<R: UserRepository>(
    State(state): State<AccountsState<R>>,
    headers: axum::http::HeaderMap,
    Path(id): Path<Uuid>,
) -> AccountResult<StatusCode> {
    let principal = current_user(&state, &headers).await?;
    state.service.admin_delete_user(&principal, id).await?;
    state.sessions.remove_for_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
