use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::auth::{Account, Role};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Persistent SQLite-backed library.
    #[default]
    Library,
    /// Ephemeral in-memory store, optionally seeded from a directory.
    Showcase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Where uploaded originals are copied.
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,

    /// Showcase seed directory (one subdirectory per album).
    #[serde(default)]
    pub showcase_path: Option<PathBuf>,
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("encore")
        .join("encore.db")
}

fn default_library_path() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("encore")
        .join("library")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            db_path: default_db_path(),
            library_path: default_library_path(),
            showcase_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    #[serde(default = "default_thumb_cache_path")]
    pub path: PathBuf,

    #[serde(default = "default_thumb_cache_size")]
    pub size: u32,
}

fn default_thumb_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("encore/thumbnails")
}

fn default_thumb_cache_size() -> u32 {
    512
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            path: default_thumb_cache_path(),
            size: default_thumb_cache_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageProtocol {
    #[default]
    Auto,
    Sixel,
    Kitty,
    ITerm2,
    Halfblocks,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default)]
    pub protocol: ImageProtocol,

    /// Bound for full-resolution decodes in the viewer.
    #[serde(default = "default_viewer_size")]
    pub viewer_size: u32,
}

fn default_viewer_size() -> u32 {
    2048
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            protocol: ImageProtocol::default(),
            viewer_size: default_viewer_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_accounts")]
    pub users: Vec<Account>,
}

fn default_accounts() -> Vec<Account> {
    vec![
        Account {
            username: "admin".to_string(),
            password: "admin2024".to_string(),
            role: Role::Admin,
        },
        Account {
            username: "dev".to_string(),
            password: "dev2024".to_string(),
            role: Role::Viewer,
        },
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users: default_accounts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    #[serde(default = "default_contact_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_service_id")]
    pub service_id: String,

    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Relay account id; the contact form is disabled until set.
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub to_email: String,
}

fn default_contact_endpoint() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".to_string()
}

fn default_service_id() -> String {
    "default_service".to_string()
}

fn default_template_id() -> String {
    "template_default".to_string()
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: default_contact_endpoint(),
            service_id: default_service_id(),
            template_id: default_template_id(),
            user_id: String::new(),
            to_email: String::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("encore")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gets_full_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Library);
        assert_eq!(config.thumbnails.size, 512);
        assert_eq!(config.auth.users.len(), 2);
        assert!(config.contact.user_id.is_empty());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            backend = "showcase"
            showcase_path = "/tmp/shows"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Showcase);
        assert_eq!(
            config.store.showcase_path.as_deref(),
            Some(std::path::Path::new("/tmp/shows"))
        );
        assert_eq!(config.preview.viewer_size, 2048);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.store.backend, config.store.backend);
        assert_eq!(back.auth.users.len(), config.auth.users.len());
    }
}
