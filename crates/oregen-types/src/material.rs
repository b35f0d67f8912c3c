use std::fmt;

use serde::{Deserialize, Serialize};

/// Block material identifier, such as `note_block` or `deepslate`.
///
/// Identifiers are trimmed and lowercased on construction, and an optional
/// `minecraft:` namespace is dropped, so `"NOTE_BLOCK"` and
/// `"minecraft:note_block"` name the same material.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Material(String);

impl Material {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim().to_ascii_lowercase();
        match name.strip_prefix("minecraft:") {
            Some(bare) => Self(bare.to_string()),
            None => Self(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The material of an empty block.
    pub fn air() -> Self {
        Self("air".into())
    }

    pub fn is_air(&self) -> bool {
        matches!(self.0.as_str(), "air" | "cave_air" | "void_air")
    }
}

impl From<&str> for Material {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Material {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<Material> for String {
    fn from(material: Material) -> Self {
        material.0
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Material({})", self.0)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
