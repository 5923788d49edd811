// config.rs - Client configuration.
//
// ClientConfig decides which goals service the client talks to and which
// owner id new goals are created under. Resolution order, later wins:
// built-in defaults, `gt.toml` in the project root, then the environment
// (`GT_API_URL`, `GT_USER_ID`). The CLI applies its own flags last.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Config file looked up in the project root.
pub const CONFIG_FILE: &str = "gt.toml";

pub const ENV_API_URL: &str = "GT_API_URL";
pub const ENV_USER_ID: &str = "GT_USER_ID";

/// Configuration for the goals REST client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service; endpoint paths start with `/api/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Owner id stamped on goals created from this client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: None,
        }
    }
}

impl ClientConfig {
    /// Resolve config for a project: `gt.toml` if present, then environment.
    pub fn for_project(project_root: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = project_root.as_ref().join(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ApiError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ApiError::ConfigParse {
            path: PathBuf::from(path),
            source,
        })
    }

    /// Override from `GT_API_URL` / `GT_USER_ID` when set.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_USER_ID).ok(),
        );
    }

    /// Override fields with any non-empty values given.
    pub fn apply_overrides(&mut self, base_url: Option<String>, user_id: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(user) = user_id.filter(|u| !u.trim().is_empty()) {
            self.user_id = Some(user.trim().to_string());
        }
    }

    /// Base URL without a trailing slash, ready for path joining.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
