//! User selections: project identity, platforms, dialect, extensions, template and overrides
//!
//! A [`SelectionModel`] is assembled once per generation request through [`SelectionBuilder`] and
//! is read-only afterwards. The builder only rejects structurally empty input; catalog-level checks
//! (registered ids, supported versions) happen in [`SelectionModel::validate`].

use crate::catalog::Catalog;
use crate::error::{EntityKind, GenerationError};
use crate::prefs::{PreferenceStore, SdkPreferences};
use crate::version::{resolve, Extremum};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A deployment target with its own generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Desktop,
    Android,
    Ios,
    Html,
    Headless,
    Server,
}

impl PlatformId {
    pub const ALL: [PlatformId; 6] = [
        PlatformId::Desktop,
        PlatformId::Android,
        PlatformId::Ios,
        PlatformId::Html,
        PlatformId::Headless,
        PlatformId::Server,
    ];

    /// Platforms that run the game for a player, as opposed to backend targets.
    pub const CLIENTS: [PlatformId; 4] = [
        PlatformId::Desktop,
        PlatformId::Android,
        PlatformId::Ios,
        PlatformId::Html,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Desktop => "desktop",
            PlatformId::Android => "android",
            PlatformId::Ios => "ios",
            PlatformId::Html => "html",
            PlatformId::Headless => "headless",
            PlatformId::Server => "server",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformId::Desktop => "Desktop",
            PlatformId::Android => "Android",
            PlatformId::Ios => "iOS",
            PlatformId::Html => "HTML (GWT)",
            PlatformId::Headless => "Headless",
            PlatformId::Server => "Server",
        }
    }

    pub fn is_client(&self) -> bool {
        Self::CLIENTS.contains(self)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" | "lwjgl" | "lwjgl3" => Ok(PlatformId::Desktop),
            "android" => Ok(PlatformId::Android),
            "ios" => Ok(PlatformId::Ios),
            "html" | "web" | "gwt" => Ok(PlatformId::Html),
            "headless" => Ok(PlatformId::Headless),
            "server" => Ok(PlatformId::Server),
            other => Err(GenerationError::unknown(EntityKind::Platform, other)),
        }
    }
}

/// Chosen language dialect and version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectChoice {
    pub id: String,
    pub version: String,
}

/// Explicit versions that bypass catalog defaults and latest/oldest resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvancedOverrides {
    pub framework_version: Option<String>,
    pub android_sdk_version: Option<String>,
    pub android_tools_version: Option<String>,
    pub gwt_version: Option<String>,
    /// Per-extension version, keyed by extension id
    pub extension_versions: BTreeMap<String, String>,
}

/// Already-fetched Android SDK version lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkVersions {
    pub api_levels: Vec<String>,
    pub build_tools: Vec<String>,
}

/// Immutable snapshot of every user choice for one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionModel {
    project_name: String,
    package_name: String,
    main_class: String,
    destination: PathBuf,
    android_sdk_path: Option<PathBuf>,
    platforms: BTreeSet<PlatformId>,
    dialect: DialectChoice,
    extensions: Vec<String>,
    template: String,
    advanced: AdvancedOverrides,
}

impl SelectionModel {
    pub fn builder(project_name: impl Into<String>) -> SelectionBuilder {
        SelectionBuilder::new(project_name)
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn android_sdk_path(&self) -> Option<&Path> {
        self.android_sdk_path.as_deref()
    }

    pub fn platforms(&self) -> &BTreeSet<PlatformId> {
        &self.platforms
    }

    pub fn dialect(&self) -> &DialectChoice {
        &self.dialect
    }

    /// Extension ids in the order they were selected.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn advanced(&self) -> &AdvancedOverrides {
        &self.advanced
    }

    /// Check that every referenced id is registered in the catalog and that the dialect version
    /// is one the dialect supports.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), GenerationError> {
        for platform in &self.platforms {
            catalog.matrix().platform(*platform)?;
        }

        let dialect = catalog.dialect(&self.dialect.id)?;
        if !dialect.versions.iter().any(|v| v == &self.dialect.version) {
            return Err(GenerationError::unknown(
                EntityKind::DialectVersion,
                format!("{} {}", self.dialect.id, self.dialect.version),
            ));
        }

        for id in &self.extensions {
            catalog.extension(id)?;
        }

        Ok(())
    }
}

/// Structural problems caught while building a selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("at least one platform must be selected")]
    NoPlatforms,
}

/// Typed construction of a [`SelectionModel`].
#[derive(Debug, Clone)]
pub struct SelectionBuilder {
    project_name: String,
    package_name: String,
    main_class: String,
    destination: PathBuf,
    android_sdk_path: Option<PathBuf>,
    platforms: BTreeSet<PlatformId>,
    dialect: DialectChoice,
    extensions: Vec<String>,
    template: String,
    advanced: AdvancedOverrides,
}

impl SelectionBuilder {
    pub const DEFAULT_PACKAGE: &'static str = "com.example.game";
    pub const DEFAULT_MAIN_CLASS: &'static str = "Main";
    pub const DEFAULT_TEMPLATE: &'static str = "basic";

    /// Starts from the defaults: Java 1.8, the basic template, destination named after the
    /// project, no platforms.
    pub fn new(project_name: impl Into<String>) -> Self {
        let project_name = project_name.into();
        Self {
            destination: PathBuf::from(&project_name),
            project_name,
            package_name: Self::DEFAULT_PACKAGE.to_string(),
            main_class: Self::DEFAULT_MAIN_CLASS.to_string(),
            android_sdk_path: None,
            platforms: BTreeSet::new(),
            dialect: DialectChoice {
                id: "java".to_string(),
                version: "1.8".to_string(),
            },
            extensions: Vec::new(),
            template: Self::DEFAULT_TEMPLATE.to_string(),
            advanced: AdvancedOverrides::default(),
        }
    }

    pub fn package_name(mut self, package: impl Into<String>) -> Self {
        self.package_name = package.into();
        self
    }

    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = main_class.into();
        self
    }

    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn android_sdk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.android_sdk_path = Some(path.into());
        self
    }

    pub fn platform(mut self, platform: PlatformId) -> Self {
        self.platforms.insert(platform);
        self
    }

    pub fn platforms(mut self, platforms: impl IntoIterator<Item = PlatformId>) -> Self {
        self.platforms.extend(platforms);
        self
    }

    /// Selects every client platform, or clears them all when every one is already selected.
    pub fn toggle_client_platforms(mut self) -> Self {
        let all_selected = PlatformId::CLIENTS
            .iter()
            .all(|p| self.platforms.contains(p));
        for platform in PlatformId::CLIENTS {
            if all_selected {
                self.platforms.remove(&platform);
            } else {
                self.platforms.insert(platform);
            }
        }
        self
    }

    /// Selects every platform, or clears the selection when everything is already selected.
    pub fn toggle_all_platforms(mut self) -> Self {
        if self.platforms.len() == PlatformId::ALL.len() {
            self.platforms.clear();
        } else {
            self.platforms.extend(PlatformId::ALL);
        }
        self
    }

    pub fn dialect(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.dialect = DialectChoice {
            id: id.into(),
            version: version.into(),
        };
        self
    }

    /// Adds an extension; selecting the same id twice keeps its first position.
    pub fn extension(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.extensions.contains(&id) {
            self.extensions.push(id);
        }
        self
    }

    pub fn extensions<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter().fold(self, |builder, id| builder.extension(id))
    }

    pub fn template(mut self, id: impl Into<String>) -> Self {
        self.template = id.into();
        self
    }

    pub fn framework_version(mut self, version: impl Into<String>) -> Self {
        self.advanced.framework_version = Some(version.into());
        self
    }

    pub fn android_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.advanced.android_sdk_version = Some(version.into());
        self
    }

    pub fn android_tools_version(mut self, version: impl Into<String>) -> Self {
        self.advanced.android_tools_version = Some(version.into());
        self
    }

    pub fn gwt_version(mut self, version: impl Into<String>) -> Self {
        self.advanced.gwt_version = Some(version.into());
        self
    }

    pub fn extension_version(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.advanced
            .extension_versions
            .insert(id.into(), version.into());
        self
    }

    /// Sets both the Android API level and the build-tools version to the newest or oldest
    /// entry of the fetched lists.
    pub fn use_sdk_extremum(
        mut self,
        sdk: &SdkVersions,
        which: Extremum,
    ) -> Result<Self, GenerationError> {
        let policy = which.into();
        self.advanced.android_sdk_version = Some(resolve("Android API", &sdk.api_levels, &policy)?);
        self.advanced.android_tools_version =
            Some(resolve("Android build tools", &sdk.build_tools, &policy)?);
        Ok(self)
    }

    /// Fills the Android SDK overrides from persisted preferences, without replacing values that
    /// were already set explicitly.
    pub fn sdk_preferences(mut self, store: &impl PreferenceStore) -> Self {
        let saved = SdkPreferences::load(store);
        if self.advanced.android_sdk_version.is_none() {
            self.advanced.android_sdk_version = saved.api_version;
        }
        if self.advanced.android_tools_version.is_none() {
            self.advanced.android_tools_version = saved.tools_version;
        }
        self
    }

    pub fn build(self) -> Result<SelectionModel, SelectionError> {
        if self.project_name.trim().is_empty() {
            return Err(SelectionError::Empty("project name"));
        }
        if self.package_name.trim().is_empty() {
            return Err(SelectionError::Empty("package name"));
        }
        if self.main_class.trim().is_empty() {
            return Err(SelectionError::Empty("main class"));
        }
        if self.template.trim().is_empty() {
            return Err(SelectionError::Empty("template"));
        }
        if self.platforms.is_empty() {
            return Err(SelectionError::NoPlatforms);
        }

        Ok(SelectionModel {
            project_name: self.project_name,
            package_name: self.package_name,
            main_class: self.main_class,
            destination: self.destination,
            android_sdk_path: self.android_sdk_path,
            platforms: self.platforms,
            dialect: self.dialect,
            extensions: self.extensions,
            template: self.template,
            advanced: self.advanced,
        })
    }
}
