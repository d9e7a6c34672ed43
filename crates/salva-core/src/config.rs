//! Configuration for Salva Shop.
//!
//! Settings are read from `~/.config/salva/config.toml` when it exists, and
//! individual values can be overridden with `SALVA_*` environment variables.
//! Every field has a default, so a missing file is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SalvaError};

const DEFAULT_CHAT_ENDPOINT: &str = "https://ai-salva-chat.vercel.app/api/chat";
const DEFAULT_CATALOG_URL: &str = "http://localhost:8787";
const DEFAULT_BIND: &str = "0.0.0.0:8787";

/// Root configuration structure for config.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalvaConfig {
    pub conversation: ConversationConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub dialogue: DialogueConfig,
    pub highlight: HighlightConfig,
    pub server: ServerConfig,
}

/// Conversational AI service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub endpoint: String,
    /// Transport-level timeout. `None` waits as long as the service takes.
    pub timeout_secs: Option<u64>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            timeout_secs: None,
        }
    }
}

impl ConversationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Session log sink settings. Without an endpoint logs are dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub endpoint: Option<String>,
}

/// Product catalog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
        }
    }
}

/// Scripted dialogue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Simulated typing time before a scripted line appears.
    pub typing_delay_ms: u64,
    /// Replaces the built-in dating story.
    pub table_path: Option<PathBuf>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: 600,
            table_path: None,
        }
    }
}

impl DialogueConfig {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }
}

/// Shelf highlight settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub ttl_secs: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self { ttl_secs: 5 }
    }
}

impl HighlightConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// JSON file holding the product list served by `/api/products`.
    pub products_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            products_path: PathBuf::from("products.json"),
        }
    }
}

impl SalvaConfig {
    /// Loads the default config file and applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(
                "[SalvaConfig] No config at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SalvaError::io(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            SalvaError::config(format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies `SALVA_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SALVA_CHAT_ENDPOINT") {
            self.conversation.endpoint = v;
        }
        if let Some(v) = lookup("SALVA_LOG_ENDPOINT") {
            self.logging.endpoint = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("SALVA_CATALOG_URL") {
            self.catalog.base_url = v;
        }
        if let Some(v) = lookup("SALVA_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = lookup("SALVA_PRODUCTS_PATH") {
            self.server.products_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SALVA_TYPING_DELAY_MS") {
            match v.parse() {
                Ok(ms) => self.dialogue.typing_delay_ms = ms,
                Err(_) => tracing::warn!("[SalvaConfig] Ignoring invalid SALVA_TYPING_DELAY_MS={}", v),
            }
        }
    }
}

/// Returns the path to the configuration file: ~/.config/salva/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("salva").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SalvaConfig::default();
        assert_eq!(config.dialogue.typing_delay(), Duration::from_millis(600));
        assert_eq!(config.highlight.ttl(), Duration::from_secs(5));
        assert_eq!(config.conversation.timeout(), None);
        assert!(config.logging.endpoint.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = SalvaConfig::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, SalvaConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[logging]
endpoint = "https://logs.example.com/exec"

[dialogue]
typing_delay_ms = 0
"#,
        )
        .unwrap();

        let config = SalvaConfig::load_from(&path).unwrap();
        assert_eq!(
            config.logging.endpoint.as_deref(),
            Some("https://logs.example.com/exec")
        );
        assert_eq!(config.dialogue.typing_delay_ms, 0);
        assert_eq!(config.highlight.ttl_secs, 5);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[dialogue\ntyping_delay_ms = ").unwrap();

        let err = SalvaConfig::load_from(&path).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SALVA_CHAT_ENDPOINT", "http://localhost:9000/chat"),
            ("SALVA_LOG_ENDPOINT", ""),
            ("SALVA_TYPING_DELAY_MS", "not-a-number"),
            ("SALVA_BIND", "127.0.0.1:0"),
        ]);
        let mut config = SalvaConfig::default();
        config.logging.endpoint = Some("https://old".into());
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.conversation.endpoint, "http://localhost:9000/chat");
        assert_eq!(config.logging.endpoint, None);
        assert_eq!(config.dialogue.typing_delay_ms, 600);
        assert_eq!(config.server.bind, "127.0.0.1:0");
    }
}
