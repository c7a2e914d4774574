//! # Application Error Type
//!
//! Everything that can stop the storefront from starting.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where errors surface                                 │
//! │                                                                         │
//! │  Startup (fatal, returned as AppError):                                 │
//! │    • config file unreadable / invalid      ──► Io, ConfigParse, Config  │
//! │    • template or required element missing  ──► Ui                       │
//! │    • storage dir cannot be created         ──► Client                   │
//! │                                                                         │
//! │  Runtime (never fatal):                                                 │
//! │    • handler errors are logged by the bus                               │
//! │    • network errors are logged and rendered into the forms              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use larek_client::ClientError;
use larek_core::CoreError;
use larek_ui::UiError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
