//! Authentication API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::{AuthManager, hash_password, verify_password};
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, MessageResponse};
use crate::core::constants::{MIN_PASSWORD_LEN, SESSION_COOKIE_NAME};
use crate::data::{DataError, TransactionalService};
use crate::data::types::{UserRole, UserRow};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(
        min = MIN_PASSWORD_LEN,
        message = "Password must be at least 8 characters"
    ))]
    pub password: String,
    /// ADMIN, ORGANIZER or PARTICIPANT; anything else becomes PARTICIPANT
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    #[schema(value_type = String)]
    pub role: UserRole,
}

impl From<UserRow> for UserDto {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserDto,
}

/// Auth state with database access
#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth_manager: Arc<AuthManager>,
    pub database: Arc<TransactionalService>,
}

/// Create auth routes
pub fn routes(auth_manager: Arc<AuthManager>, database: Arc<TransactionalService>) -> Router {
    let state = AuthRoutesState {
        auth_manager,
        database,
    };

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input or user already exists")
    )
)]
pub async fn register(
    State(state): State<AuthRoutesState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = normalize_email(&request.email);
    let role = request
        .role
        .as_deref()
        .map(UserRole::parse_or_default)
        .unwrap_or_default();

    let repo = state.database.repository();
    if repo.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request("USER_EXISTS", "User already exists"));
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            ApiError::internal("Failed to register user")
        })?;

    // A concurrent registration can still win the unique index
    let user = repo
        .create_user(&email, &password_hash, role)
        .await
        .map_err(|e| match e {
            DataError::Conflict(_) => ApiError::bad_request("USER_EXISTS", "User already exists"),
            other => ApiError::from_data(other),
        })?;

    tracing::debug!(user_id = %user.id, role = %user.role, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Log in and receive a session cookie
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Session cookie set, redirect to /"),
        (status = 400, description = "Incorrect email or invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let email = normalize_email(&request.email);
    let user = state
        .database
        .repository()
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::bad_request("INCORRECT_EMAIL", "Incorrect email."))?;

    let password = request.password;
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::internal(format!("Password check task failed: {}", e)))?
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
            false
        });
    if !verified {
        return Err(ApiError::bad_request("INVALID_CREDENTIALS", "Invalid credentials."));
    }

    let token = state.auth_manager.issue_session(&user).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue session token");
        ApiError::internal("Failed to create session")
    })?;

    tracing::debug!(user_id = %user.id, "User logged in");
    Ok((
        jar.add(state.auth_manager.session_cookie(token)),
        Redirect::to("/"),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(state.auth_manager.removal_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Current user from the session cookie
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Authenticated user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
) -> Result<Json<MeResponse>, ApiError> {
    let not_authenticated = || ApiError::unauthorized("NOT_AUTHENTICATED", "Not authenticated");

    let cookie = jar.get(SESSION_COOKIE_NAME).ok_or_else(not_authenticated)?;
    let claims = state
        .auth_manager
        .validate_session(cookie.value())
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected session cookie");
            not_authenticated()
        })?;

    // The account may have been removed after the token was issued
    let user = state
        .database
        .repository()
        .get_user(claims.user_id())
        .await?
        .ok_or_else(not_authenticated)?;

    Ok(Json(MeResponse { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use crate::core::config::AuthConfig;

    async fn app() -> Router {
        let database = Arc::new(TransactionalService::in_memory().await.unwrap());
        let auth = Arc::new(AuthManager::new(&AuthConfig::default()));
        routes(auth, database)
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_login_me() {
        let app = app().await;
        let creds = serde_json::json!({ "email": "Runner@Example.com", "password": "longenough" });

        let response = app
            .clone()
            .oneshot(json_post("/register", creds.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "runner@example.com");
        assert_eq!(body["user"]["role"], "PARTICIPANT");

        let response = app
            .clone()
            .oneshot(json_post("/login", creds))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["user"]["email"], "runner@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let app = app().await;
        let creds = serde_json::json!({ "email": "a@b.co", "password": "password1", "role": "ADMIN" });
        let first = app
            .clone()
            .oneshot(json_post("/register", creds.clone()))
            .await
            .unwrap();
        assert_eq!(body_json(first).await["user"]["role"], "ADMIN");

        let second = app.oneshot(json_post("/register", creds)).await.unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(second).await["message"], "User already exists");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(json_post(
                "/login",
                serde_json::json!({ "email": "nobody@x.io", "password": "whatever1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Incorrect email.");

        app.clone()
            .oneshot(json_post(
                "/register",
                serde_json::json!({ "email": "me@x.io", "password": "correct-horse" }),
            ))
            .await
            .unwrap();
        let response = app
            .oneshot(json_post(
                "/login",
                serde_json::json!({ "email": "me@x.io", "password": "wrong-horse" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid credentials.");
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let response = app()
            .await
            .oneshot(json_post(
                "/register",
                serde_json::json!({ "email": "me@x.io", "password": "short" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_without_cookie() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Not authenticated");
    }
}
