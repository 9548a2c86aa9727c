use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Local document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per store key.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    /// Read back critical writes (set completion, saves) to catch silent storage failures.
    #[serde(default = "default_verify_writes")]
    pub verify_writes: bool,
}

fn default_storage_dir() -> String {
    "data/liftsync".into()
}
fn default_verify_writes() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            verify_writes: default_verify_writes(),
        }
    }
}

/// Remote database configuration.
/// The API key is NOT stored here; it is read from the environment variable named by `api_key_env`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote REST API. Empty disables remote sync entirely.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "LIFTSYNC_API_KEY".into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn is_enabled(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Signed-in user. The access token is read from the environment variable
/// named by `access_token_env`; without one, requests carry the API key only.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Opaque user identity attached to remote rows.
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
}

fn default_access_token_env() -> String {
    "LIFTSYNC_ACCESS_TOKEN".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            access_token_env: default_access_token_env(),
        }
    }
}

impl SessionConfig {
    pub fn access_token(&self) -> Option<String> {
        std::env::var(&self.access_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Connectivity gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Always report offline (completed workouts are queued, never pushed).
    #[serde(default)]
    pub force_offline: bool,
    /// Path probed on the remote to decide whether we are online.
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
}

fn default_probe_path() -> String {
    "/rest/v1/".into()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            force_offline: false,
            probe_path: default_probe_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback chain: explicit path → ./config/default.toml → hardcoded defaults.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Self {
        if let Some(path) = explicit_path {
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {e}", path.display());
                }
            }
        }

        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            match Self::load(default_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load default config: {e}");
                }
            }
        }

        tracing::info!("Using hardcoded default configuration");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.storage.dir, "data/liftsync");
        assert!(cfg.storage.verify_writes);
        assert!(!cfg.remote.is_enabled());
        assert_eq!(cfg.remote.timeout_secs, 10);
        assert!(!cfg.sync.force_offline);
        assert_eq!(cfg.sync.probe_path, "/rest/v1/");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [storage]
            dir = "/tmp/lift"

            [remote]
            base_url = "https://db.example.com"

            [sync]
            force_offline = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.storage.dir, "/tmp/lift");
        assert!(cfg.storage.verify_writes);
        assert!(cfg.remote.is_enabled());
        assert_eq!(cfg.remote.api_key_env, "LIFTSYNC_API_KEY");
        assert!(cfg.sync.force_offline);
        assert!(cfg.session.user_id.is_empty());
        assert_eq!(cfg.session.access_token_env, "LIFTSYNC_ACCESS_TOKEN");
    }

    #[test]
    fn access_token_reads_named_env_var() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [session]
            user_id = "u1"
            access_token_env = "LIFTSYNC_TEST_ACCESS_TOKEN_CONFIG"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.session.access_token(), None);
        std::env::set_var("LIFTSYNC_TEST_ACCESS_TOKEN_CONFIG", "jwt-1");
        assert_eq!(cfg.session.access_token().as_deref(), Some("jwt-1"));
        std::env::remove_var("LIFTSYNC_TEST_ACCESS_TOKEN_CONFIG");
    }

    #[test]
    fn load_or_default_falls_back_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[storage\ndir = ").unwrap();
        let cfg = AppConfig::load_or_default(Some(&path));
        assert!(cfg.storage.verify_writes);
    }
}
