//! Connection settings from the environment and command-line flags.

use habitica_api::ConfigUpdate;

pub const ENV_USER_ID: &str = "HABITICA_USER_ID";
pub const ENV_API_KEY: &str = "HABITICA_API_KEY";
pub const ENV_ENDPOINT: &str = "HABITICA_ENDPOINT";
pub const ENV_PLATFORM: &str = "HABITICA_PLATFORM";

/// Settings gathered before the client is built. `None` keeps the library default.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    pub platform: Option<String>,
}

impl Settings {
    /// Reads settings from the process environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            endpoint: read(ENV_ENDPOINT),
            user_id: read(ENV_USER_ID),
            api_key: read(ENV_API_KEY),
            platform: read(ENV_PLATFORM),
        }
    }

    /// Overlays `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Settings) -> Self {
        Self {
            endpoint: other.endpoint.or(self.endpoint),
            user_id: other.user_id.or(self.user_id),
            api_key: other.api_key.or(self.api_key),
            platform: other.platform.or(self.platform),
        }
    }

    pub fn to_update(&self) -> ConfigUpdate {
        let mut update = ConfigUpdate::new();
        if let Some(endpoint) = &self.endpoint {
            update = update.endpoint(endpoint.clone());
        }
        if let Some(user_id) = &self.user_id {
            update = update.id(user_id.clone());
        }
        if let Some(api_key) = &self.api_key {
            update = update.api_key(api_key.clone());
        }
        if let Some(platform) = &self.platform {
            update = update.platform(platform.clone());
        }
        update
    }
}
