//! Manifest loading and identifier regeneration.
//!
//! The manifest is a JSON descriptor living inside the watched tree. On every
//! qualifying change its header identifier and every module identifier are
//! replaced with fresh random UUIDs; every other value is written back as it
//! was read. Keys the manifest shape does not name are carried through
//! untouched.
//!
//! The rewritten file is pretty-printed with 2-space indentation, so the
//! textual layout may differ from the original even though the values match.

use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ManifestError;

/// A parsed manifest document.
///
/// Missing or `null` known keys fall back to zero values; values of the
/// wrong type are parse errors.
///
/// # Examples
///
/// ```
/// use pk_core::Manifest;
///
/// let json = r#"{
///     "format_version": 2,
///     "header": {"name": "demo", "uuid": "old", "version": [1, 0, 0]},
///     "modules": [{"type": "data", "uuid": "old", "version": [1, 0, 0]}]
/// }"#;
///
/// let mut manifest: Manifest = serde_json::from_str(json).unwrap();
/// manifest.regenerate_ids();
///
/// assert_ne!(manifest.header.uuid, "old");
/// assert_ne!(manifest.modules[0].uuid, "old");
/// assert_eq!(manifest.header.version, vec![1, 0, 0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Manifest format version.
    #[serde(deserialize_with = "null_as_default")]
    pub format_version: i64,

    /// Pack-level description and identity.
    #[serde(deserialize_with = "null_as_default")]
    pub header: ManifestHeader,

    /// Modules shipped by the pack, in file order.
    #[serde(deserialize_with = "null_as_default")]
    pub modules: Vec<ManifestModule>,

    /// Top-level keys not named above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `header` object of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestHeader {
    /// Human readable description.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,

    /// Pack name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Pack identifier, regenerated on every rewrite.
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,

    /// Pack version triple.
    #[serde(deserialize_with = "null_as_default")]
    pub version: Vec<i64>,

    /// Minimum engine version triple.
    #[serde(deserialize_with = "null_as_default")]
    pub min_engine_version: Vec<i64>,

    /// Header keys not named above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the `modules` array of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestModule {
    /// Human readable description.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,

    /// Module type tag.
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,

    /// Module identifier, regenerated on every rewrite.
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,

    /// Module version triple.
    #[serde(deserialize_with = "null_as_default")]
    pub version: Vec<i64>,

    /// Module keys not named above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] if the file cannot be read and
    /// [`ManifestError::Parse`] if it does not match the manifest shape.
    pub fn load(path: &Utf8Path) -> Result<Self, ManifestError> {
        let contents = fs::read(path).map_err(|e| ManifestError::read(path, e))?;
        serde_json::from_slice(&contents).map_err(|e| ManifestError::parse(path, e))
    }

    /// Replaces the header identifier and every module identifier with a
    /// fresh random UUID.
    pub fn regenerate_ids(&mut self) {
        self.header.uuid = new_id();
        for module in &mut self.modules {
            module.uuid = new_id();
        }
    }

    /// Renders the manifest as 2-space indented JSON without a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }

    /// Writes the manifest to `path`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Serialize`] or [`ManifestError::Write`].
    pub fn save(&self, path: &Utf8Path) -> Result<(), ManifestError> {
        let rendered = self.to_json()?;
        fs::write(path, rendered).map_err(|e| ManifestError::write(path, e))
    }
}

/// Loads the manifest at `path`, regenerates its identifiers and writes it
/// back in place.
///
/// Returns the rewritten manifest.
///
/// # Errors
///
/// Propagates any [`ManifestError`] from reading, parsing or writing. The
/// file is left untouched unless the final write is reached.
pub fn rewrite_manifest(path: &Utf8Path) -> Result<Manifest, ManifestError> {
    let mut manifest = Manifest::load(path)?;
    let previous = manifest.header.uuid.clone();

    manifest.regenerate_ids();
    manifest.save(path)?;

    tracing::info!(
        path = %path,
        previous = %previous,
        header_uuid = %manifest.header.uuid,
        modules = manifest.modules.len(),
        "Manifest identifiers regenerated"
    );

    Ok(manifest)
}

fn new_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Reads `null` as the zero value of `T`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
