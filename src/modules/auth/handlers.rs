use anyhow::Context;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use shelf_authz::{issue_token, password, session_cookie, Role};
use shelf_http::{AppError, JsonBody};
use shelf_kernel::AppState;
use tower_cookies::Cookies;

use super::models::{LoginRequest, LoginResponse, RegisterRequest, User};
use crate::utils::{missing, non_blank, MessageResponse};

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let name = non_blank(body.name);
    let email = non_blank(body.email);
    let password = non_blank(body.password);
    let role = non_blank(body.role);

    let absent = missing(&[
        ("name", name.is_some()),
        ("email", email.is_some()),
        ("password", password.is_some()),
        ("role", role.is_some()),
    ]);
    let (Some(name), Some(email), Some(password), Some(role)) = (name, email, password, role)
    else {
        return Err(AppError::missing_fields(&absent, "All fields are required"));
    };

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict(
            vec![json!({ "field": "email", "error": "taken" })],
            "Email already registered",
        ));
    }

    // Unrecognised roles fall back to a plain account.
    let role = role.parse::<Role>().unwrap_or(Role::User);
    let hashed = password::hash_password(password, state.settings.auth.bcrypt_cost).await?;

    let id = sqlx::query("INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, ?)")
        .bind(&name)
        .bind(&email)
        .bind(&hashed)
        .bind(role.as_str())
        .execute(&state.db)
        .await?
        .last_insert_rowid();

    tracing::info!(user_id = id, %role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /login
///
/// The lookup is keyed on the role the client names as well as the email,
/// so an account is only found under its stored role.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = non_blank(body.email);
    let password = non_blank(body.password);
    let role = non_blank(body.role);

    let absent = missing(&[
        ("email", email.is_some()),
        ("password", password.is_some()),
        ("role", role.is_some()),
    ]);
    let (Some(email), Some(password), Some(role)) = (email, password, role) else {
        return Err(AppError::missing_fields(
            &absent,
            "Email, password, and role are required",
        ));
    };

    let role: Role = role
        .parse()
        .map_err(|_| AppError::bad_request("Invalid role provided"))?;

    let user: Option<User> = sqlx::query_as(
        "SELECT id, name, email, password, role FROM users WHERE email = ? AND role = ?",
    )
    .bind(&email)
    .bind(role.as_str())
    .fetch_optional(&state.db)
    .await?;

    let Some(user) = user else {
        tracing::warn!(%role, "login for unknown account");
        return Err(AppError::not_found(format!(
            "No {} found with this email",
            role
        )));
    };

    if !password::verify_password(password, user.password.clone()).await? {
        tracing::warn!(user_id = user.id, "invalid password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let auth = &state.settings.auth;
    let token = issue_token(auth, user.id, user.role).context("failed to sign session token")?;
    cookies.add(session_cookie(auth, token.clone()));

    tracing::info!(user_id = user.id, role = %user.role, "login successful");
    Ok(Json(LoginResponse {
        message: format!("{} login successful", role),
        token,
        user: user.into(),
    }))
}
