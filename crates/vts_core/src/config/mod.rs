//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use vts_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Indexer: {}", config.settings().indexer.kind);
//!
//! // Modify a setting
//! config.settings_mut().titles.safe_indices = true;
//!
//! // Save just the titles section atomically
//! config.update_section(ConfigSection::Titles).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, IndexerSettings, LoggingSettings, PathSettings, Settings, TitleSettings,
};
