//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::disc::ResolverOptions;
use crate::indexer::ConfiguredIndexer;
use crate::logging::LogLevel;
use crate::models::IndexerKind;
use crate::sequence::SourceArgs;
use crate::titles::MENU_SIZE_THRESHOLD;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Indexer selection.
    #[serde(default)]
    pub indexer: IndexerSettings,

    /// Title and chapter resolution.
    #[serde(default)]
    pub titles: TitleSettings,
}

impl Settings {
    /// Resolver options described by these settings.
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            safe_indices: self.titles.safe_indices,
            force_root: self.titles.force_root,
            menu_size_threshold: self.titles.menu_size_threshold,
            source_args: self.indexer.source_args(),
        }
    }

    /// Indexer described by `[indexer]`, storing indexes in
    /// `paths.index_dir` when one is set.
    pub fn indexer(&self) -> ConfiguredIndexer {
        ConfiguredIndexer::new(
            self.indexer.kind,
            self.indexer.executable(),
            self.paths.index_dir(),
        )
    }
}

/// Path configuration for index files and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for index files. Empty keeps indexes next to the disc.
    #[serde(default)]
    pub index_dir: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            index_dir: String::new(),
            logs_folder: default_logs_folder(),
        }
    }
}

impl PathSettings {
    /// Index directory, if one is configured.
    pub fn index_dir(&self) -> Option<PathBuf> {
        if self.index_dir.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.index_dir))
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write logs to the logs folder.
    #[serde(default)]
    pub file_output: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file_output: false,
        }
    }
}

/// Indexer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexerSettings {
    /// Which indexer builds the frame index.
    #[serde(default)]
    pub kind: IndexerKind,

    /// Executable override. Empty uses the tool's default name.
    #[serde(default)]
    pub executable: String,

    /// Extra source filter arguments as `key=value` entries.
    #[serde(default)]
    pub source_args: Vec<String>,
}

impl IndexerSettings {
    /// Executable to run for the configured indexer.
    pub fn executable(&self) -> &str {
        if self.executable.trim().is_empty() {
            self.kind.executable()
        } else {
            &self.executable
        }
    }

    /// Parsed source filter arguments. Entries without `=` are skipped.
    pub fn source_args(&self) -> SourceArgs {
        self.source_args
            .iter()
            .filter_map(|entry| match entry.split_once('=') {
                Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
                None => {
                    tracing::warn!("Ignoring source argument without '=': {}", entry);
                    None
                }
            })
            .collect()
    }
}

/// Title resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleSettings {
    /// Trim chapters that run past the decoded stream.
    #[serde(default)]
    pub safe_indices: bool,

    /// Treat the disc path as the IFO/VOB directory itself.
    #[serde(default)]
    pub force_root: bool,

    /// First-video size in bytes above which the disc has a menu segment.
    #[serde(default = "default_menu_size_threshold")]
    pub menu_size_threshold: u64,
}

fn default_menu_size_threshold() -> u64 {
    MENU_SIZE_THRESHOLD
}

impl Default for TitleSettings {
    fn default() -> Self {
        Self {
            safe_indices: false,
            force_root: false,
            menu_size_threshold: default_menu_size_threshold(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Indexer,
    Titles,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Indexer => "indexer",
            ConfigSection::Titles => "titles",
        }
    }

    /// Comment written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Index and log directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Indexer => "VOB indexer (d2v_witch or dg_index_nv)",
            ConfigSection::Titles => "Title splitting and chapter repair",
        }
    }

    /// Every section in file order.
    pub fn all() -> &'static [ConfigSection] {
        &[
            ConfigSection::Paths,
            ConfigSection::Logging,
            ConfigSection::Indexer,
            ConfigSection::Titles,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::DvdIndexer;
    use std::path::Path;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[titles]"));
        assert!(toml.contains("menu_size_threshold = 8192"));
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.indexer.kind = IndexerKind::DgIndexNv;
        settings.indexer.source_args = vec!["fieldop=1".to_string()];

        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.indexer.kind, IndexerKind::DgIndexNv);
        assert_eq!(parsed.indexer.source_args, settings.indexer.source_args);
        assert_eq!(parsed.logging.level, settings.logging.level);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[titles]\nsafe_indices = true";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom value preserved
        assert!(parsed.titles.safe_indices);
        // Defaults applied for missing
        assert_eq!(parsed.titles.menu_size_threshold, 8192);
        assert_eq!(parsed.indexer.kind, IndexerKind::D2vWitch);
        assert!(parsed.paths.index_dir().is_none());
    }

    #[test]
    fn resolver_options_follow_settings() {
        let toml = r#"
[indexer]
kind = "dg_index_nv"
source_args = ["fieldop=2", "broken"]

[titles]
safe_indices = true
force_root = true
menu_size_threshold = 4096
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        let options = settings.resolver_options();

        assert!(options.safe_indices);
        assert!(options.force_root);
        assert_eq!(options.menu_size_threshold, 4096);
        assert_eq!(options.source_args.get("fieldop"), Some("2"));
        assert_eq!(options.source_args.iter().count(), 1);
        assert_eq!(settings.indexer.executable(), "DGIndexNV");
    }

    #[test]
    fn indexer_follows_settings() {
        let toml = r#"
[paths]
index_dir = "/var/cache/vts"

[indexer]
kind = "dg_index_nv"
executable = "/opt/dgindexnv/DGIndexNV"
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        let indexer = settings.indexer();

        assert_eq!(indexer.kind(), IndexerKind::DgIndexNv);
        let index = indexer.index_path(Path::new("/discs/MOVIE"));
        assert!(index.starts_with("/var/cache/vts"));
        assert!(matches!(indexer, ConfiguredIndexer::Dgi(_)));
    }

    #[test]
    fn default_indexer_keeps_index_next_to_disc() {
        let indexer = Settings::default().indexer();
        assert_eq!(indexer.kind(), IndexerKind::D2vWitch);
        assert_eq!(
            indexer.index_path(Path::new("/discs/MOVIE")),
            PathBuf::from("/discs/MOVIE.d2v")
        );
    }
}
