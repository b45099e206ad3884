//! Per-module dependency resolution
//!
//! Combines the selection with the compatibility matrix and the version resolver. Extensions that
//! cannot run on any selected platform are dropped with a diagnostic; an incompatible dialect
//! version rejects the whole selection.
//!
//! Within a module, dependencies come in this order: framework artifacts (core) or platform
//! backends, the dialect standard library (core), then extensions in selection order.

use crate::catalog::{ArtifactId, Catalog, ModuleId};
use crate::error::{Diagnostic, GenerationError, Result};
use crate::selection::SelectionModel;
use crate::version::{coordinate_for, parse_version, ArtifactCoordinate, VersionChoice};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Source id recorded for the framework's own core artifacts
pub const FRAMEWORK_DEPENDENCY: &str = "gdx";

/// One dependency line of a module's build descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    pub module: String,
    /// Id of the extension. The dialect id marks its standard library, [`FRAMEWORK_DEPENDENCY`]
    /// the framework itself and a platform id that platform's backend.
    pub extension: String,
    pub coordinate: ArtifactCoordinate,
}

impl ResolvedDependency {
    pub fn version(&self) -> &str {
        &self.coordinate.version
    }

    pub fn notation(&self) -> String {
        self.coordinate.notation()
    }
}

/// Output of [`DependencyResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Module names in catalog order, core first
    pub modules: Vec<String>,
    pub dependencies: BTreeMap<String, Vec<ResolvedDependency>>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct DependencyResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, selection: &SelectionModel) -> Result<Resolution> {
        let matrix = self.catalog.matrix();
        let platforms = selection.platforms();

        self.check_dialect(selection)?;

        let module_ids = matrix.shared_modules_for(platforms)?;
        let modules: Vec<String> = module_ids
            .iter()
            .map(|id| matrix.modules().get(*id).name.clone())
            .collect();
        let mut dependencies: BTreeMap<String, Vec<ResolvedDependency>> = modules
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        let mut diagnostics = Vec::new();

        let framework_version = selection
            .advanced()
            .framework_version
            .clone()
            .unwrap_or_else(|| self.catalog.framework_version().to_string());
        let framework = |module: &str, source: &str, artifact: &ArtifactId| ResolvedDependency {
            module: module.to_string(),
            extension: source.to_string(),
            coordinate: ArtifactCoordinate {
                artifact: artifact.clone(),
                version: framework_version.clone(),
            },
        };

        let core = matrix.modules().get(ModuleId::CORE).name.clone();
        for artifact in self.catalog.core_artifacts() {
            dependencies
                .entry(core.clone())
                .or_default()
                .push(framework(&core, FRAMEWORK_DEPENDENCY, artifact));
        }

        // Platforms sharing a module contribute each backend artifact once
        for module_id in module_ids.iter().filter(|id| **id != ModuleId::CORE) {
            let module = &matrix.modules().get(*module_id).name;
            let mut seen = BTreeSet::new();
            for platform in matrix.active_platforms(*module_id, platforms) {
                for artifact in &self.catalog.platform(platform)?.artifacts {
                    if seen.insert(artifact) {
                        dependencies
                            .entry(module.clone())
                            .or_default()
                            .push(framework(module, platform.as_str(), artifact));
                    }
                }
            }
        }

        let dialect = self.catalog.dialect(&selection.dialect().id)?;
        if let Some(stdlib) = &dialect.stdlib {
            dependencies
                .entry(core.clone())
                .or_default()
                .push(ResolvedDependency {
                    module: core.clone(),
                    extension: dialect.id.clone(),
                    coordinate: ArtifactCoordinate {
                        artifact: stdlib.clone(),
                        version: selection.dialect().version.clone(),
                    },
                });
        }

        for ext_id in selection.extensions() {
            let extension = self.catalog.extension(ext_id)?;

            let mut supported = BTreeSet::new();
            let mut unsupported = Vec::new();
            for platform in platforms {
                if matrix.is_compatible(ext_id, *platform)? {
                    supported.insert(*platform);
                } else {
                    unsupported.push(platform.as_str().to_string());
                }
            }

            if supported.is_empty() {
                debug!(extension = %ext_id, "no selected platform supports extension, skipping");
                diagnostics.push(Diagnostic::NoApplicablePlatform {
                    extension: ext_id.clone(),
                });
                continue;
            }
            if !unsupported.is_empty() {
                diagnostics.push(Diagnostic::PartiallyApplicable {
                    extension: ext_id.clone(),
                    unsupported,
                });
            }

            let version = match selection.advanced().extension_versions.get(ext_id) {
                Some(explicit) => VersionChoice::Explicit(explicit.clone()),
                None => VersionChoice::Catalog(
                    extension
                        .default_version
                        .clone()
                        .unwrap_or_else(|| framework_version.clone()),
                ),
            };

            for module_id in &module_ids {
                let active = matrix.active_platforms(*module_id, platforms);
                if !active.iter().any(|p| supported.contains(p)) {
                    continue;
                }
                let module = &matrix.modules().get(*module_id).name;
                let coordinate = coordinate_for(extension, module, &version);
                debug!(
                    extension = %ext_id,
                    module = %module,
                    coordinate = %coordinate,
                    "resolved extension dependency"
                );
                dependencies
                    .entry(module.clone())
                    .or_default()
                    .push(ResolvedDependency {
                        module: module.clone(),
                        extension: ext_id.clone(),
                        coordinate,
                    });
            }
        }

        Ok(Resolution {
            modules,
            dependencies,
            diagnostics,
        })
    }

    /// Rejects the selection when any selected platform needs a newer dialect version.
    fn check_dialect(&self, selection: &SelectionModel) -> Result<()> {
        let dialect = selection.dialect();
        let selected = parse_version(&dialect.version)?;

        for platform in selection.platforms() {
            let Some(required) = self
                .catalog
                .matrix()
                .min_dialect_version(*platform, &dialect.id)?
            else {
                continue;
            };
            if selected < parse_version(required)? {
                return Err(GenerationError::IncompatibleDialectVersion {
                    platform: platform.as_str().to_string(),
                    dialect: dialect.id.clone(),
                    required: required.to_string(),
                    selected: dialect.version.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::PlatformId;

    const CATALOG: &str = r#"
framework_version: "1.9.10"
defaults:
  android_sdk_version: "28"
  android_tools_version: "28.0.3"
platforms:
  - id: desktop
  - id: android
    min_dialect_versions:
      kotlin: "1.3"
  - id: html
dialects:
  - id: java
    name: Java
    versions: ["1.8"]
  - id: kotlin
    name: Kotlin
    versions: ["1.1", "1.3"]
    stdlib: org.jetbrains.kotlin:kotlin-stdlib
extensions:
  - id: box2d
    name: Box2D
    url: https://example.com/box2d
    category: official
    platforms: all
    artifact: com.badlogicgames.gdx:gdx-box2d
    modules:
      desktop:
        artifact: com.badlogicgames.gdx:gdx-box2d-platform:natives-desktop
  - id: visui
    name: VisUI
    url: https://example.com/visui
    category: third-party
    default_version: "1.4.4"
    platforms: [desktop, android]
    artifact: com.kotcrab.vis:vis-ui
  - id: gwt-only-ext
    name: GWT only
    url: https://example.com/gwt
    category: third-party
    default_version: "1.0.0"
    platforms: [html]
    artifact: com.example:gwt-only
"#;

    fn catalog() -> Catalog {
        Catalog::from_yaml(CATALOG).unwrap()
    }

    fn notations(resolution: &Resolution, module: &str) -> Vec<String> {
        resolution.dependencies[module]
            .iter()
            .map(ResolvedDependency::notation)
            .collect()
    }

    #[test]
    fn test_extension_in_core_and_platform_modules() {
        let catalog = catalog();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Desktop)
            .extension("box2d")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert_eq!(resolution.modules, vec!["core", "desktop"]);
        assert_eq!(
            notations(&resolution, "core"),
            vec!["com.badlogicgames.gdx:gdx-box2d:1.9.10"]
        );
        assert_eq!(
            notations(&resolution, "desktop"),
            vec!["com.badlogicgames.gdx:gdx-box2d-platform:1.9.10:natives-desktop"]
        );
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_extension_skipped_where_unsupported() {
        let catalog = catalog();
        let selection = SelectionModel::builder("demo")
            .platforms([PlatformId::Desktop, PlatformId::Html])
            .extension("visui")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert_eq!(notations(&resolution, "desktop").len(), 1);
        assert_eq!(notations(&resolution, "core").len(), 1);
        assert!(resolution.dependencies["html"].is_empty());
        assert_eq!(
            resolution.diagnostics,
            vec![Diagnostic::PartiallyApplicable {
                extension: "visui".to_string(),
                unsupported: vec!["html".to_string()],
            }]
        );
    }

    #[test]
    fn test_no_applicable_platform() {
        let catalog = catalog();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Desktop)
            .extension("gwt-only-ext")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert!(resolution.dependencies.values().all(Vec::is_empty));
        assert_eq!(
            resolution.diagnostics,
            vec![Diagnostic::NoApplicablePlatform {
                extension: "gwt-only-ext".to_string()
            }]
        );
    }

    #[test]
    fn test_dialect_below_platform_minimum() {
        let catalog = catalog();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Android)
            .dialect("kotlin", "1.1")
            .build()
            .unwrap();

        let err = DependencyResolver::new(&catalog)
            .resolve(&selection)
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::IncompatibleDialectVersion {
                platform: "android".to_string(),
                dialect: "kotlin".to_string(),
                required: "1.3".to_string(),
                selected: "1.1".to_string(),
            }
        );
    }

    #[test]
    fn test_dialect_stdlib_comes_first() {
        let catalog = catalog();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Android)
            .dialect("kotlin", "1.3")
            .extension("visui")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert_eq!(
            notations(&resolution, "core"),
            vec![
                "org.jetbrains.kotlin:kotlin-stdlib:1.3",
                "com.kotcrab.vis:vis-ui:1.4.4"
            ]
        );
    }

    #[test]
    fn test_order_follows_selection() {
        let catalog = catalog();
        let build = |exts: [&str; 2]| {
            SelectionModel::builder("demo")
                .platform(PlatformId::Desktop)
                .extensions(exts)
                .build()
                .unwrap()
        };
        let resolver = DependencyResolver::new(&catalog);

        let first = resolver.resolve(&build(["visui", "box2d"])).unwrap();
        let extensions: Vec<&str> = first.dependencies["core"]
            .iter()
            .map(|d| d.extension.as_str())
            .collect();
        assert_eq!(extensions, vec!["visui", "box2d"]);

        let second = resolver.resolve(&build(["box2d", "visui"])).unwrap();
        let extensions: Vec<&str> = second.dependencies["core"]
            .iter()
            .map(|d| d.extension.as_str())
            .collect();
        assert_eq!(extensions, vec!["box2d", "visui"]);
    }

    #[test]
    fn test_explicit_versions_are_kept() {
        let catalog = catalog();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Desktop)
            .extensions(["box2d", "visui"])
            .framework_version("1.9.11")
            .extension_version("visui", "1.5.0")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert_eq!(
            notations(&resolution, "core"),
            vec![
                "com.badlogicgames.gdx:gdx-box2d:1.9.11",
                "com.kotcrab.vis:vis-ui:1.5.0"
            ]
        );
    }

    const SHARED: &str = r#"
framework_version: "1.9.10"
defaults:
  android_sdk_version: "28"
  android_tools_version: "28.0.3"
core_artifacts:
  - com.badlogicgames.gdx:gdx
platforms:
  - id: desktop
    artifacts:
      - com.badlogicgames.gdx:gdx-backend-lwjgl3
      - com.badlogicgames.gdx:gdx-platform:natives-desktop
  - id: headless
    module: desktop
    artifacts:
      - com.badlogicgames.gdx:gdx-backend-headless
      - com.badlogicgames.gdx:gdx-platform:natives-desktop
  - id: html
dialects:
  - id: java
    name: Java
    versions: ["1.8"]
extensions:
  - id: box2d
    name: Box2D
    url: https://example.com/box2d
    category: official
    platforms: all
    artifact: com.badlogicgames.gdx:gdx-box2d
    modules:
      desktop:
        artifact: com.badlogicgames.gdx:gdx-box2d-platform:natives-desktop
"#;

    #[test]
    fn test_framework_and_backends_come_first() {
        let catalog = Catalog::from_yaml(SHARED).unwrap();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Desktop)
            .extension("box2d")
            .framework_version("1.9.11")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert_eq!(
            notations(&resolution, "core"),
            vec![
                "com.badlogicgames.gdx:gdx:1.9.11",
                "com.badlogicgames.gdx:gdx-box2d:1.9.11"
            ]
        );
        assert_eq!(
            notations(&resolution, "desktop"),
            vec![
                "com.badlogicgames.gdx:gdx-backend-lwjgl3:1.9.11",
                "com.badlogicgames.gdx:gdx-platform:1.9.11:natives-desktop",
                "com.badlogicgames.gdx:gdx-box2d-platform:1.9.11:natives-desktop"
            ]
        );
        assert_eq!(
            resolution.dependencies["core"][0].extension,
            FRAMEWORK_DEPENDENCY
        );
    }

    #[test]
    fn test_platforms_sharing_a_module_resolve_once() {
        let catalog = Catalog::from_yaml(SHARED).unwrap();
        let selection = SelectionModel::builder("demo")
            .platforms([PlatformId::Desktop, PlatformId::Headless])
            .extension("box2d")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert_eq!(resolution.modules, vec!["core", "desktop"]);

        for module in ["core", "desktop"] {
            let box2d = resolution.dependencies[module]
                .iter()
                .filter(|d| d.extension == "box2d")
                .count();
            assert_eq!(box2d, 1, "{}", module);
        }
        // natives-desktop is listed by both platforms but declared once
        assert_eq!(
            notations(&resolution, "desktop"),
            vec![
                "com.badlogicgames.gdx:gdx-backend-lwjgl3:1.9.10",
                "com.badlogicgames.gdx:gdx-platform:1.9.10:natives-desktop",
                "com.badlogicgames.gdx:gdx-backend-headless:1.9.10",
                "com.badlogicgames.gdx:gdx-box2d-platform:1.9.10:natives-desktop"
            ]
        );
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_platform_without_backend_gets_extensions_only() {
        let catalog = Catalog::from_yaml(SHARED).unwrap();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Html)
            .extension("box2d")
            .build()
            .unwrap();

        let resolution = DependencyResolver::new(&catalog).resolve(&selection).unwrap();
        assert_eq!(
            notations(&resolution, "html"),
            vec!["com.badlogicgames.gdx:gdx-box2d:1.9.10"]
        );
    }

    #[test]
    fn test_unknown_extension() {
        let catalog = catalog();
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Desktop)
            .extension("nope")
            .build()
            .unwrap();
        assert!(matches!(
            DependencyResolver::new(&catalog).resolve(&selection),
            Err(GenerationError::UnknownEntity { .. })
        ));
    }
}
