//! Loading and saving the settings file.
//!
//! Whole-file saves write every section with a comment header. Section
//! updates go through `toml_edit` so the rest of the file, comments
//! included, is kept as the user left it. Every write goes to a sibling
//! temp file that is then renamed over the config.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings file and its in-memory [`Settings`].
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path`. Nothing is read until
    /// [`load`](Self::load) or [`load_or_create`](Self::load_or_create).
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Changes stay in memory until [`save`](Self::save) or
    /// [`update_section`](Self::update_section).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load an existing config file.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.is_file() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load the config file, writing defaults when it is missing.
    ///
    /// A file lacking one of the known sections, or carrying sections
    /// this crate does not know, is rewritten in full.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if !self.config_path.is_file() {
            tracing::info!("Writing default config to {}", self.config_path.display());
            self.settings = Settings::default();
            return self.save();
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;

        if needs_rewrite(&content.parse()?) {
            tracing::debug!("Normalising sections of {}", self.config_path.display());
            self.save()?;
        }

        Ok(())
    }

    /// Create the logs folder and, when configured, the index folder.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        let mut dirs = vec![self.logs_folder()];
        dirs.extend(self.settings.paths.index_dir());

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Write every section to disk.
    pub fn save(&self) -> ConfigResult<()> {
        let mut output = String::from("# DVD title resolution configuration\n");

        for &section in ConfigSection::all() {
            output.push_str(&format!(
                "\n# {}\n[{}]\n{}",
                section.description(),
                section.table_name(),
                self.section_toml(section)?
            ));
        }

        write_atomic(&self.config_path, &output)?;
        Ok(())
    }

    /// Write `section` from memory into the file on disk, leaving the
    /// other sections as they are on disk.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let mut doc = match fs::read_to_string(&self.config_path) {
            Ok(content) => content.parse::<DocumentMut>()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => DocumentMut::new(),
            Err(e) => return Err(e.into()),
        };

        let table = self.section_toml(section)?.parse::<DocumentMut>()?;
        doc[section.table_name()] = Item::Table(table.as_table().clone());

        write_atomic(&self.config_path, &doc.to_string())?;
        Ok(())
    }

    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let content = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
            ConfigSection::Indexer => toml::to_string_pretty(&self.settings.indexer)?,
            ConfigSection::Titles => toml::to_string_pretty(&self.settings.titles)?,
        };
        Ok(content)
    }
}

/// Whether the document misses a known section or has an unknown one.
fn needs_rewrite(doc: &DocumentMut) -> bool {
    let known = |key: &str| ConfigSection::all().iter().any(|s| s.table_name() == key);

    doc.iter().any(|(key, _)| !known(key))
        || ConfigSection::all()
            .iter()
            .any(|s| !doc.contains_key(s.table_name()))
}

fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
}
