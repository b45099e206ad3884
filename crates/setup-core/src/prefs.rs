//! Key-value preference persistence
//!
//! The generator only remembers the Android SDK versions between runs. Stores are plain string
//! maps so a front end can swap in its own backing.

use crate::selection::AdvancedOverrides;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default preference file name, created next to generated projects
pub const PREFS_FILE: &str = ".gdx-setup.yaml";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<&str>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store, used by tests and one-shot runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Store backed by a flat YAML mapping on disk. Changes are kept in memory until [`save`].
///
/// [`save`]: YamlPreferences::save
#[derive(Debug, Clone)]
pub struct YamlPreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl YamlPreferences {
    /// Read preferences from `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse preferences: {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content =
            serde_yaml::to_string(&self.values).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))
    }
}

impl PreferenceStore for YamlPreferences {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Remembered Android SDK choices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkPreferences {
    pub api_version: Option<String>,
    pub tools_version: Option<String>,
}

impl SdkPreferences {
    pub const API_KEY: &'static str = "androidSdkVersion";
    pub const TOOLS_KEY: &'static str = "androidToolsVersion";

    pub fn load(store: &impl PreferenceStore) -> Self {
        Self {
            api_version: store.get(Self::API_KEY).map(str::to_string),
            tools_version: store.get(Self::TOOLS_KEY).map(str::to_string),
        }
    }

    /// Store the SDK versions of `overrides`. Unset versions leave the stored value alone.
    pub fn save(store: &mut impl PreferenceStore, overrides: &AdvancedOverrides) {
        if let Some(api) = &overrides.android_sdk_version {
            store.set(Self::API_KEY, api.clone());
        }
        if let Some(tools) = &overrides.android_tools_version {
            store.set(Self::TOOLS_KEY, tools.clone());
        }
    }
}
