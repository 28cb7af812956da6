use serde::Deserialize;

/// Body of `POST /users` and `POST /sessions`. Missing fields decode as
/// empty strings and are left to validation.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
