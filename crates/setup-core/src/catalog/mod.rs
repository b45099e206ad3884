//! Platform, dialect and extension catalog
//!
//! The catalog is loaded once (from the built-in YAML document or a user-supplied file) and is
//! read-only afterwards. Share it between requests with an `Arc`.

pub mod display;
pub mod manifest;
pub mod matrix;

use crate::error::{EntityKind, GenerationError};
use crate::product::ProductConfig;
use crate::selection::PlatformId;
use crate::templates::is_module_relative;
use crate::version::parse_version;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

pub use display::DisplayLists;
pub use manifest::{
    ArtifactId, CatalogManifest, Category, Defaults, Extension, GradlePlugin, LanguageDialect,
    ModuleArtifact, PlatformDef, PlatformSupport, Repository,
};
pub use matrix::{CompatibilityMatrix, Module, ModuleArena, ModuleId, CORE_MODULE};

const BUILTIN_CATALOG: &str = include_str!("default.yaml");

/// Loaded, validated catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    framework_version: String,
    gwt_versions: Vec<String>,
    core_artifacts: Vec<ArtifactId>,
    repositories: Vec<Repository>,
    defaults: Defaults,
    platforms: Vec<PlatformDef>,
    dialects: Vec<LanguageDialect>,
    extensions: Vec<Extension>,
    matrix: CompatibilityMatrix,
}

impl Catalog {
    /// The catalog shipped with the generator
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG).context("Failed to load built-in catalog")
    }

    /// Pick the catalog source: an explicit file, then the product's environment variable, then
    /// the built-in catalog.
    pub fn from_config<C: ProductConfig>(config: &C, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(config.catalog_env()) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Self::builtin(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load catalog {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: CatalogManifest =
            serde_yaml::from_str(content).context("Failed to parse catalog")?;
        Self::from_manifest(manifest)
    }

    pub fn from_manifest(manifest: CatalogManifest) -> Result<Self> {
        validate(&manifest)?;
        let matrix = CompatibilityMatrix::from_manifest(&manifest);
        Ok(Self {
            framework_version: manifest.framework_version,
            gwt_versions: manifest.gwt_versions,
            core_artifacts: manifest.core_artifacts,
            repositories: manifest.repositories,
            defaults: manifest.defaults,
            platforms: manifest.platforms,
            dialects: manifest.dialects,
            extensions: manifest.extensions,
            matrix,
        })
    }

    pub fn framework_version(&self) -> &str {
        &self.framework_version
    }

    pub fn gwt_versions(&self) -> &[String] {
        &self.gwt_versions
    }

    pub fn core_artifacts(&self) -> &[ArtifactId] {
        &self.core_artifacts
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn platform(&self, id: PlatformId) -> Result<&PlatformDef, GenerationError> {
        self.platforms
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| GenerationError::unknown(EntityKind::Platform, id.as_str()))
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn dialects(&self) -> &[LanguageDialect] {
        &self.dialects
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn matrix(&self) -> &CompatibilityMatrix {
        &self.matrix
    }

    pub fn dialect(&self, id: &str) -> Result<&LanguageDialect, GenerationError> {
        self.dialects
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| GenerationError::unknown(EntityKind::Dialect, id))
    }

    pub fn extension(&self, id: &str) -> Result<&Extension, GenerationError> {
        self.extensions
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| GenerationError::unknown(EntityKind::Extension, id))
    }

    pub fn display_lists(&self) -> DisplayLists {
        DisplayLists::from_catalog(self)
    }
}

/// Catalog consistency checks: unique ids, parseable versions, known module and dialect names.
fn validate(manifest: &CatalogManifest) -> Result<()> {
    parse_version(&manifest.framework_version)?;
    for version in &manifest.gwt_versions {
        parse_version(version)?;
    }

    let mut platform_ids = HashSet::new();
    let mut module_names: HashSet<&str> = HashSet::from([CORE_MODULE]);
    for platform in &manifest.platforms {
        if !platform_ids.insert(platform.id) {
            anyhow::bail!("Platform '{}' is declared twice", platform.id);
        }
        if platform.module_name() == CORE_MODULE {
            anyhow::bail!(
                "Platform '{}' cannot be served by the '{}' module",
                platform.id,
                CORE_MODULE
            );
        }
        let module = platform.module_name();
        if !is_module_relative(module) || module.contains(['/', '\\']) {
            anyhow::bail!(
                "Platform '{}' names an invalid module directory '{}'",
                platform.id,
                module
            );
        }
        module_names.insert(module);

        for plugin in &platform.plugins {
            if let Some(classpath) = &plugin.classpath {
                let segments: Vec<&str> = classpath.split(':').collect();
                if segments.len() != 3 || segments.iter().any(|s| s.trim().is_empty()) {
                    anyhow::bail!(
                        "Plugin '{}' of platform '{}' has an invalid classpath '{}', expected group:name:version",
                        plugin.id,
                        platform.id,
                        classpath
                    );
                }
            }
        }
    }

    let mut dialect_ids = HashSet::new();
    for dialect in &manifest.dialects {
        if !dialect_ids.insert(dialect.id.as_str()) {
            anyhow::bail!("Dialect '{}' is declared twice", dialect.id);
        }
        if dialect.versions.is_empty() {
            anyhow::bail!("Dialect '{}' lists no versions", dialect.id);
        }
        for version in &dialect.versions {
            parse_version(version)
                .with_context(|| format!("Dialect '{}' has an invalid version", dialect.id))?;
        }
    }

    for platform in &manifest.platforms {
        for (dialect, version) in &platform.min_dialect_versions {
            if !dialect_ids.contains(dialect.as_str()) {
                anyhow::bail!(
                    "Platform '{}' constrains unknown dialect '{}'",
                    platform.id,
                    dialect
                );
            }
            parse_version(version)?;
        }
    }

    let mut extension_ids = HashSet::new();
    for ext in &manifest.extensions {
        if !extension_ids.insert(ext.id.as_str()) {
            anyhow::bail!("Extension '{}' is declared twice", ext.id);
        }
        if ext.category == Category::ThirdParty && ext.default_version.is_none() {
            anyhow::bail!(
                "Third-party extension '{}' needs a default_version",
                ext.id
            );
        }
        for module in ext.modules.keys() {
            if !module_names.contains(module.as_str()) {
                anyhow::bail!(
                    "Extension '{}' configures unknown module '{}'",
                    ext.id,
                    module
                );
            }
        }
    }

    Ok(())
}
