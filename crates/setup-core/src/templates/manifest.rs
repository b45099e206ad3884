//! Template manifest types and parsing

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root template manifest (`<catalog>/template.yaml`)
/// Lists the template directories (or `<name>.zip` bundles) of a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    /// List of template names
    pub templates: Vec<String>,
}

/// Per-template manifest (`<catalog>/<name>/template.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Display name of the template
    pub name: String,

    /// Description of what the template provides
    pub description: String,

    /// Oldest generator version able to apply this template
    #[serde(default)]
    pub version: Option<String>,

    /// Blueprint files per module, relative to `<name>/<module>/`.
    /// An empty list means every file below the module directory.
    pub files: BTreeMap<String, Vec<String>>,
}

impl TemplateManifest {
    /// Modules this template ships files for
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}
