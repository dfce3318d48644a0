use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The user document returned by local registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub api_token: String,
    /// Remaining user fields, kept as raw JSON.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Credentials returned by local login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub id: String,
    pub api_token: String,
    #[serde(default)]
    pub new_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
