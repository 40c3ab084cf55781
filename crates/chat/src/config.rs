//! Configuration loading for the chat server connection
//!
//! Supports loading server credentials from (in order of priority):
//! 1. Compile-time embedded credentials (for production builds)
//! 2. JSON file in the Nova config directory
//! 3. Runtime environment variables (fallback)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Credentials filename in the Nova config directory
const CREDENTIALS_FILE: &str = "server-credentials.json";

/// Credentials for connecting to a chat server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCredentials {
    /// Base URL of the server, e.g. `https://chat.example.com`
    pub server_url: String,
    /// Session or personal-access token sent as a bearer token
    pub token: String,
}

impl ServerCredentials {
    /// Load credentials using the following priority:
    /// 1. Compile-time embedded credentials (for production builds)
    /// 2. JSON file (`server-credentials.json` in the Nova config directory)
    /// 3. Runtime environment variables
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            return config::load_json(CREDENTIALS_FILE);
        }

        Self::from_env()
    }

    /// Load credentials embedded at compile time via environment variables.
    /// Build with: NOVA_SERVER_URL=xxx NOVA_TOKEN=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let server_url = option_env!("NOVA_SERVER_URL")?;
        let token = option_env!("NOVA_TOKEN")?;

        if server_url.is_empty() || token.is_empty() {
            return None;
        }

        Some(Self {
            server_url: server_url.to_string(),
            token: token.to_string(),
        })
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Parse credentials from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse credentials JSON")
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let server_url = std::env::var("NOVA_SERVER_URL")
            .context("NOVA_SERVER_URL environment variable not set")?;
        let token =
            std::env::var("NOVA_TOKEN").context("NOVA_TOKEN environment variable not set")?;

        Ok(Self { server_url, token })
    }

    /// Get the default credentials file path in the Nova config directory
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }

    /// Save these credentials to the Nova config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(CREDENTIALS_FILE, self)
    }

    /// Check if credentials are available (compile-time, file, or env vars)
    pub fn is_available() -> bool {
        if Self::from_compile_time().is_some() {
            return true;
        }
        if config::config_exists(CREDENTIALS_FILE) {
            return true;
        }
        std::env::var("NOVA_SERVER_URL").is_ok() && std::env::var("NOVA_TOKEN").is_ok()
    }
}
