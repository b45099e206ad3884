//! Catalog file types and parsing

use crate::selection::PlatformId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Maven-style artifact id: `group:name` or `group:name:classifier`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId {
    pub group: String,
    pub name: String,
    pub classifier: Option<String>,
}

impl FromStr for ArtifactId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(format!("invalid artifact '{}': empty segment", s));
        }
        match parts.as_slice() {
            [group, name] => Ok(ArtifactId {
                group: group.to_string(),
                name: name.to_string(),
                classifier: None,
            }),
            [group, name, classifier] => Ok(ArtifactId {
                group: group.to_string(),
                name: name.to_string(),
                classifier: Some(classifier.to_string()),
            }),
            _ => Err(format!(
                "invalid artifact '{}': expected group:name[:classifier]",
                s
            )),
        }
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(classifier) => write!(f, "{}:{}:{}", self.group, self.name, classifier),
            None => write!(f, "{}:{}", self.group, self.name),
        }
    }
}

/// Maven repository the generated build resolves artifacts from.
///
/// Written in the catalog as a Gradle shorthand (`mavenCentral`, `google`, ...) or a repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Repository {
    MavenLocal,
    MavenCentral,
    Google,
    GradlePluginPortal,
    Maven(Url),
}

impl Repository {
    /// Gradle DSL line declaring this repository.
    pub fn gradle(&self) -> String {
        match self {
            Repository::Maven(url) => format!("maven {{ url '{}' }}", url),
            shorthand => format!("{}()", shorthand),
        }
    }
}

impl FromStr for Repository {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mavenLocal" => Ok(Repository::MavenLocal),
            "mavenCentral" => Ok(Repository::MavenCentral),
            "google" => Ok(Repository::Google),
            "gradlePluginPortal" => Ok(Repository::GradlePluginPortal),
            other => Url::parse(other)
                .map(Repository::Maven)
                .map_err(|e| format!("invalid repository '{}': {}", other, e)),
        }
    }
}

impl TryFrom<String> for Repository {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Repository> for String {
    fn from(repository: Repository) -> Self {
        repository.to_string()
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repository::MavenLocal => f.write_str("mavenLocal"),
            Repository::MavenCentral => f.write_str("mavenCentral"),
            Repository::Google => f.write_str("google"),
            Repository::GradlePluginPortal => f.write_str("gradlePluginPortal"),
            Repository::Maven(url) => f.write_str(url.as_str()),
        }
    }
}

/// Platforms an extension can be used on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSupport")]
pub enum PlatformSupport {
    /// Wildcard covering every platform, including ones added to the catalog later
    #[default]
    All,
    Only(Vec<PlatformId>),
}

impl PlatformSupport {
    pub fn supports(&self, platform: PlatformId) -> bool {
        match self {
            PlatformSupport::All => true,
            PlatformSupport::Only(platforms) => platforms.contains(&platform),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSupport {
    Keyword(String),
    Platforms(Vec<PlatformId>),
}

impl TryFrom<RawSupport> for PlatformSupport {
    type Error = String;

    fn try_from(raw: RawSupport) -> Result<Self, Self::Error> {
        match raw {
            RawSupport::Keyword(k) if k.eq_ignore_ascii_case("all") => Ok(PlatformSupport::All),
            RawSupport::Keyword(k) => Err(format!(
                "expected 'all' or a list of platforms, found '{}'",
                k
            )),
            RawSupport::Platforms(platforms) => Ok(PlatformSupport::Only(platforms)),
        }
    }
}

/// Whether an extension is maintained with the framework or by a third party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Official,
    ThirdParty,
}

/// Module-specific replacement of an extension's artifact and/or version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModuleArtifact {
    #[serde(default)]
    pub artifact: Option<ArtifactId>,

    #[serde(default)]
    pub version: Option<String>,
}

/// An optional library addable to generated modules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Extension {
    pub id: String,

    /// Display name
    pub name: String,

    /// Project page or documentation
    pub url: Url,

    pub category: Category,

    /// Version used when the user does not override it. Official extensions fall back to the
    /// framework version.
    #[serde(default)]
    pub default_version: Option<String>,

    #[serde(default)]
    pub platforms: PlatformSupport,

    /// Artifact added to every module unless a module entry replaces it
    pub artifact: ArtifactId,

    /// Per-module replacements, keyed by module name
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleArtifact>,
}

/// A source-language variant usable atop the base project language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageDialect {
    pub id: String,
    pub name: String,

    /// Supported versions, in display order
    pub versions: Vec<String>,

    /// Standard library added to the core module, versioned with the dialect
    #[serde(default)]
    pub stdlib: Option<ArtifactId>,
}

/// Gradle plugin applied by a platform's module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GradlePlugin {
    pub id: String,

    /// Buildscript classpath entry (`group:name:version`). Plugins bundled with Gradle need none.
    #[serde(default)]
    pub classpath: Option<String>,

    /// Gradle block appended to the module's build file. Placeholders allowed.
    #[serde(default)]
    pub config: Option<String>,
}

/// A platform entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformDef {
    pub id: PlatformId,

    /// Name of the generated module serving this platform (defaults to the platform id).
    /// Platforms naming the same module share it.
    #[serde(default)]
    pub module: Option<String>,

    /// Minimum dialect version required by this platform's toolchain, keyed by dialect id
    #[serde(default)]
    pub min_dialect_versions: BTreeMap<String, String>,

    /// Backend and native artifacts the platform's module always needs, at the framework version
    #[serde(default)]
    pub artifacts: Vec<ArtifactId>,

    #[serde(default)]
    pub plugins: Vec<GradlePlugin>,
}

impl PlatformDef {
    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Versions used when the selection does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Defaults {
    pub android_sdk_version: String,
    pub android_tools_version: String,
}

/// Root catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogManifest {
    /// Version of the game framework itself
    pub framework_version: String,

    /// GWT versions offered for the html platform
    #[serde(default)]
    pub gwt_versions: Vec<String>,

    /// Framework artifacts added to the core module, at the framework version
    #[serde(default)]
    pub core_artifacts: Vec<ArtifactId>,

    /// Repositories written to the root build file, in order
    #[serde(default)]
    pub repositories: Vec<Repository>,

    pub defaults: Defaults,

    pub platforms: Vec<PlatformDef>,

    pub dialects: Vec<LanguageDialect>,

    #[serde(default)]
    pub extensions: Vec<Extension>,
}
