//! Configuration system
//!
//! [`Config`] gives any serde type TOML/RON file persistence; [`LoaderConfig`]
//! holds the knobs of the model loader itself.

pub use serde::{Serialize, Deserialize};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        match ConfigFormat::from_path(path) {
            Some(format) => format.parse(&contents),
            None => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Toml) => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some(ConfigFormat::Ron) => {
                ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                    .map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            None => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Text formats understood by the configuration and metadata loaders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml` files
    Toml,
    /// `.ron` files
    Ron,
}

impl ConfigFormat {
    /// Pick a format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "ron" => Some(Self::Ron),
            _ => None,
        }
    }

    /// Pick a format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Deserialize `contents` in this format
    pub fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// # Model Loader Configuration
///
/// Controls where the loader looks for per-model metafiles and textures,
/// and the texture flags used when a metafile does not set them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Metafile extensions probed next to a model, in priority order
    pub metadata_extensions: Vec<String>,
    /// Directories searched for texture files named by a model
    pub texture_search_dirs: Vec<String>,
    /// Default for the `fliptextures` metadata key
    pub flip_textures: bool,
    /// Default for the `invertteamcolor` metadata key
    pub invert_team_color: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            metadata_extensions: vec!["toml".to_string(), "ron".to_string()],
            texture_search_dirs: vec!["unittextures".to_string()],
            flip_textures: true,
            invert_team_color: true,
        }
    }
}

impl Config for LoaderConfig {}
