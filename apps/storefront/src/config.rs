//! # Storefront Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LAREK_API_URL=https://...                                          │
//! │     LAREK_CDN_URL=https://...                                          │
//! │     LAREK_STORAGE_DIR=/tmp/larek                                       │
//! │     LAREK_CURRENCY=synapses                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.larek.storefront/... (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [api]
//! base_url = "https://larek-api.nomoreparties.co/api/weblarek"
//! cdn_url = "https://larek-api.nomoreparties.co/content/weblarek"
//!
//! [storage]
//! dir = "/home/me/.local/share/storefront"   # optional
//!
//! [display]
//! currency = "synapses"
//! priceless_label = "Priceless"
//! ```

use larek_client::FileStore;
use larek_core::Money;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

// =============================================================================
// API Settings
// =============================================================================

/// Where the catalog and order endpoints live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Prefix for `/product` and `/order`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix for relative product image paths.
    #[serde(default = "default_cdn_url")]
    pub cdn_url: String,
}

fn default_base_url() -> String {
    "https://larek-api.nomoreparties.co/api/weblarek".to_string()
}

fn default_cdn_url() -> String {
    "https://larek-api.nomoreparties.co/content/weblarek".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            cdn_url: default_cdn_url(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local snapshot storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for the snapshot files. Defaults to the platform data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StorageSettings {
    /// The configured directory, or the platform default.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(FileStore::default_dir)
    }
}

// =============================================================================
// Display Settings
// =============================================================================

/// How prices are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Unit appended to every price.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Shown instead of a price for products that are not for sale.
    #[serde(default = "default_priceless_label")]
    pub priceless_label: String,
}

fn default_currency() -> String {
    "synapses".to_string()
}

fn default_priceless_label() -> String {
    "Priceless".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency: default_currency(),
            priceless_label: default_priceless_label(),
        }
    }
}

impl DisplaySettings {
    /// `750 synapses`, or the priceless label for `None`.
    pub fn format_price(&self, price: Option<Money>) -> String {
        match price {
            Some(amount) => self.format_amount(amount),
            None => self.priceless_label.clone(),
        }
    }

    pub fn format_amount(&self, amount: Money) -> String {
        format!("{} {}", amount, self.currency)
    }
}

// =============================================================================
// Storefront Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl StorefrontConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Override with the TOML file (if it exists)
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        for (name, url) in [("base_url", &self.api.base_url), ("cdn_url", &self.api.cdn_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "{} must start with http:// or https://, got: {}",
                    name, url
                )));
            }
        }

        if self.display.currency.trim().is_empty() {
            return Err(AppError::Config("currency must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("LAREK_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(url) = lookup("LAREK_CDN_URL") {
            debug!(url = %url, "Overriding CDN URL from environment");
            self.api.cdn_url = url;
        }

        if let Some(dir) = lookup("LAREK_STORAGE_DIR") {
            self.storage.dir = Some(PathBuf::from(dir));
        }

        if let Some(currency) = lookup("LAREK_CURRENCY") {
            self.display.currency = currency;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "larek", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert!(config.api.base_url.ends_with("/api/weblarek"));
        assert_eq!(config.display.currency, "synapses");
        assert_eq!(config.storage.dir, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::default();

        config.api.base_url = "ftp://larek".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "http://localhost:3000/api".to_string();
        assert!(config.validate().is_ok());

        config.api.cdn_url = "content".to_string();
        assert!(config.validate().is_err());

        config.api.cdn_url = "https://cdn".to_string();
        config.display.currency = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: StorefrontConfig = toml::from_str(
            r#"
            [display]
            currency = "credits"
            "#,
        )
        .unwrap();
        assert_eq!(config.display.currency, "credits");
        assert_eq!(config.display.priceless_label, "Priceless");
        assert_eq!(config.api, ApiSettings::default());
    }

    #[test]
    fn test_overrides() {
        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| match key {
            "LAREK_API_URL" => Some("http://localhost:8080".to_string()),
            "LAREK_STORAGE_DIR" => Some("/tmp/larek".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.cdn_url, default_cdn_url());
        assert_eq!(config.storage.dir, Some(PathBuf::from("/tmp/larek")));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storefront.toml");

        let mut config = StorefrontConfig::default();
        config.display.priceless_label = "Not for sale".to_string();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));
        assert!(contents.contains("[display]"));

        let loaded: StorefrontConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.display.priceless_label, "Not for sale");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(&path, "[api]\nbase_url = \"larek.local\"\n").unwrap();

        assert!(matches!(
            StorefrontConfig::load(Some(path)),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_format_price() {
        let display = DisplaySettings::default();
        assert_eq!(display.format_price(Some(Money::from_units(750))), "750 synapses");
        assert_eq!(display.format_price(None), "Priceless");
        assert_eq!(display.format_amount(Money::zero()), "0 synapses");
    }
}
