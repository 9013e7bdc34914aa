use std::env;

use serde::{Deserialize, Serialize};

/// Json struct for deployment settings
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    /// Base URL of the participant record store
    pub store_url: Option<String>,
    pub web_port: Option<u16>,
    /// Shared password for the admin pages
    pub admin_password: Option<String>,
}

impl Settings {
    /// Fallback used when no settings file is provided.
    pub fn from_env() -> Self {
        Settings {
            store_url: env::var("STORE_URL").ok(),
            web_port: env::var("WEB_PORT").ok().and_then(|port| port.parse().ok()),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}
