use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// Access-token claims. `sub` is the only source of the caller's owner id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: Uuid,
    pub username: String,
}

// -- Queries --

/// Body for both create and update. Missing fields deserialize as empty
/// strings so they fail validation with 400 rather than a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct SaveQueryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub query: String,
}

// -- Sharing --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_link: String,
    pub share_token: String,
}

// -- AI assistant --

#[derive(Debug, Default, Deserialize)]
pub struct AssistRequest {
    pub text: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssistResponse {
    pub result: String,
}
