use serde::Deserialize;

/// Body of `POST /api/users/register`. Missing fields arrive empty and are
/// rejected by the store's validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/users/login`. `username` also accepts an email address.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "email")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
