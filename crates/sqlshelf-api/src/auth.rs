use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, info};
use uuid::Uuid;

use sqlshelf_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::library::{blocking, now, parse_uuid, run_blocking};
use crate::state::AppState;

const MAX_USERNAME_LEN: usize = 32;

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    // Stored trimmed, so " alice" and "alice" are the same account.
    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("username and password are required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }

    let user_id = Uuid::new_v4();
    let stored_name = username.clone();
    let password = req.password;

    // Hash and insert off the runtime. The UNIQUE index decides duplicates.
    let created = blocking(&state.db, move |db| {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();
        let (_, ts) = now();
        db.create_user(&user_id.to_string(), &stored_name, &password_hash, &ts)
    })
    .await?;

    if !created {
        return Err(AppError::Conflict("username already exists".into()));
    }

    info!("Registered user {} ({})", username, user_id);
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, username })))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("username and password are required"));
    }

    let user = blocking(&state.db, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(AppError::UnknownUser)?;

    // Verify password
    let password = req.password;
    let stored_hash = user.password;
    let verified = run_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow::anyhow!("corrupt password hash: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await?;

    if !verified {
        debug!("Rejected login for {}", user.username);
        return Err(AppError::BadCredentials);
    }

    let user_id = parse_uuid(&user.id)?;
    let access_token = issue_token(&state.settings.jwt_secret, user_id, &user.username, state.settings.token_ttl)?;

    Ok(Json(LoginResponse {
        access_token,
        user_id,
        username: user.username,
    }))
}

/// Signs an HS256 access token for `user_id` that expires after `ttl`.
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    username: &str,
    ttl: chrono::Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Any failure here (signature, expiry, shape) is an invalid token.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims)
}
