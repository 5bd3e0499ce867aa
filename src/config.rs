//! Startup configuration.
//!
//! Read from `<config dir>/dbseek/config.json` when present, then overridden
//! by the `BOT_TOKEN` and `DBSEEK_ADMIN` environment variables.

use crate::access::UserId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const APP_NAME: &str = "dbseek";
const CONFIG_FILE: &str = "config.json";

/// Token used when none is configured; the gateway still works locally
pub const PLACEHOLDER_TOKEN: &str = "YOUR_TOKEN_HERE";

pub const TOKEN_ENV: &str = "BOT_TOKEN";
pub const ADMIN_ENV: &str = "DBSEEK_ADMIN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared secret the gateway must present with every update
    #[serde(default = "default_bot_token")]
    pub bot_token: String,

    /// First admin; every other admin is granted through `/setadmin`
    #[serde(default = "default_bootstrap_admin")]
    pub bootstrap_admin: UserId,

    /// Contact shown by `/support` and `/info`
    #[serde(default = "default_support_contact")]
    pub support_contact: String,
}

fn default_bot_token() -> String {
    PLACEHOLDER_TOKEN.to_string()
}

fn default_bootstrap_admin() -> UserId {
    UserId(1063257439)
}

fn default_support_contact() -> String {
    "@gpsblue".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: default_bot_token(),
            bootstrap_admin: default_bootstrap_admin(),
            support_contact: default_support_contact(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match get_config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.bot_token = token;
        }

        if let Some(admin) = lookup(ADMIN_ENV) {
            self.bootstrap_admin = admin
                .parse()
                .with_context(|| format!("{} must be an integer user id", ADMIN_ENV))?;
        }

        Ok(())
    }

    pub fn uses_placeholder_token(&self) -> bool {
        self.bot_token == PLACEHOLDER_TOKEN
    }
}

/// Path of the optional config file
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}
