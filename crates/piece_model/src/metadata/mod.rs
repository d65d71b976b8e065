//! Per-model metadata tables
//!
//! A model can ship with a metafile (`<model>.toml` or `<model>.ron`) whose
//! values override what the importer reports. The document is a tree of
//! string-keyed tables; every lookup takes a caller-supplied default that is
//! returned when the key is absent or holds a value of the wrong shape.
//!
//! ```toml
//! radius = 30.0
//! tex1 = "tank_diffuse.png"
//!
//! [pieces.Turret]
//! parent = "Base"
//! offset = [0.0, 4.5, 0.0]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigFormat};
use crate::foundation::math::Vec3;

/// String-keyed table of metadata values
pub type MetaMap = BTreeMap<String, MetaValue>;

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Boolean flag
    Bool(bool),
    /// Integer number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Str(String),
    /// Ordered list (vectors are 3-element lists)
    List(Vec<MetaValue>),
    /// Nested table
    Table(MetaMap),
}

impl MetaValue {
    /// Numeric view of the value, if it is a number
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Int(i) => Some(*i as f32),
            Self::Float(f) => Some(*f as f32),
            _ => None,
        }
    }
}

/// A parsed metadata document
///
/// An invalid document (missing file, parse failure, non-table root) behaves
/// exactly like an empty one: every lookup yields its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    root: Option<MetaMap>,
}

impl Metadata {
    /// An invalid, empty document
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an already built table
    pub fn from_map(map: MetaMap) -> Self {
        Self { root: Some(map) }
    }

    /// Parse a document in the given format
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let value: MetaValue = format.parse(contents)?;
        match value {
            MetaValue::Table(map) => Ok(Self::from_map(map)),
            _ => Err(ConfigError::Parse("metadata root must be a table".to_string())),
        }
    }

    /// Load a document from disk, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, format)
    }

    /// Find the metafile belonging to a model file
    ///
    /// For each extension, `<model path>.<ext>` is tried first and then
    /// `<model dir>/<model stem>.<ext>`.
    pub fn find_for_model(model_path: &Path, extensions: &[String]) -> Option<PathBuf> {
        let stem = model_path.file_stem().map(|s| s.to_string_lossy().into_owned());
        extensions.iter().find_map(|ext| {
            let mut full = model_path.as_os_str().to_owned();
            full.push(".");
            full.push(ext);
            // only the last extension is replaced: tank.v2.dae -> tank.v2.<ext>
            let by_stem = stem
                .as_ref()
                .map(|stem| model_path.with_file_name(format!("{stem}.{ext}")));
            std::iter::once(PathBuf::from(full))
                .chain(by_stem)
                .find(|candidate| candidate.is_file())
        })
    }

    /// Root table view
    pub fn root(&self) -> MetaTable<'_> {
        MetaTable { map: self.root.as_ref() }
    }

    /// Whether the document parsed into a table
    pub fn is_valid(&self) -> bool {
        self.root.is_some()
    }
}

/// Borrowed view of one table inside a [`Metadata`] document
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaTable<'a> {
    map: Option<&'a MetaMap>,
}

impl<'a> MetaTable<'a> {
    /// A view with no backing table
    pub fn invalid() -> Self {
        Self { map: None }
    }

    /// Whether this view is backed by a table
    pub fn is_valid(&self) -> bool {
        self.map.is_some()
    }

    /// Raw value lookup
    pub fn get(&self, key: &str) -> Option<&'a MetaValue> {
        self.map.and_then(|map| map.get(key))
    }

    /// Whether `key` is present (regardless of its type)
    pub fn key_exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Nested table; invalid if absent or not a table
    pub fn sub_table(&self, key: &str) -> MetaTable<'a> {
        match self.get(key) {
            Some(MetaValue::Table(map)) => MetaTable { map: Some(map) },
            _ => MetaTable::invalid(),
        }
    }

    /// Number lookup
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get(key).and_then(MetaValue::as_f32).unwrap_or(default)
    }

    /// Three-component vector lookup (a list of three numbers)
    pub fn get_float3(&self, key: &str, default: Vec3) -> Vec3 {
        match self.get(key) {
            Some(MetaValue::List(items)) if items.len() >= 3 => {
                match (items[0].as_f32(), items[1].as_f32(), items[2].as_f32()) {
                    (Some(x), Some(y), Some(z)) => Vec3::new(x, y, z),
                    _ => default,
                }
            }
            _ => default,
        }
    }

    /// Integer lookup; floats are truncated
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(MetaValue::Int(i)) => *i,
            Some(MetaValue::Float(f)) => *f as i64,
            _ => default,
        }
    }

    /// Boolean lookup; numbers are true when non-zero
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(MetaValue::Bool(b)) => *b,
            Some(MetaValue::Int(i)) => *i != 0,
            Some(MetaValue::Float(f)) => *f != 0.0,
            Some(MetaValue::Str(s)) => match s.as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// String lookup; numbers and booleans are formatted
    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(MetaValue::Str(s)) => s.clone(),
            Some(MetaValue::Int(i)) => i.to_string(),
            Some(MetaValue::Float(f)) => f.to_string(),
            Some(MetaValue::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }
}
