//! Project generation
//!
//! [`ProjectGenerator`] ties the pieces together: it validates a [`SelectionModel`] against the
//! catalog, resolves per-module dependencies, applies the selected template and merges both into a
//! [`GeneratedProject`]. Generation is pure; writing the result is left to
//! [`crate::writer::ProjectWriter`].

use crate::catalog::{Catalog, ModuleId, Repository};
use crate::error::{Diagnostic, GenerationError, Result};
use crate::resolve::{DependencyResolver, ResolvedDependency};
use crate::selection::{PlatformId, SelectionModel};
use crate::templates::{Placeholders, TemplateApplier, TemplateCatalog};
use crate::version::{parse_version, requires_newer, resolve, Extremum, VersionPolicy};
use crate::writer::BUILD_FILE;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Build property keys written to the root of the project
pub mod keys {
    pub const APP_NAME: &str = "appName";
    pub const GDX_VERSION: &str = "gdxVersion";
    pub const ANDROID_SDK_VERSION: &str = "androidSdkVersion";
    pub const ANDROID_TOOLS_VERSION: &str = "androidToolsVersion";
    pub const GWT_VERSION: &str = "gwtVersion";

    /// `<id>Version` with the id camel-cased, so `gwt-only-ext` becomes `gwtOnlyExtVersion`.
    pub fn version_key(id: &str) -> String {
        let mut key = String::with_capacity(id.len() + 7);
        let mut upper = false;
        for c in id.chars() {
            if matches!(c, '-' | '_' | '.' | ' ') {
                upper = !key.is_empty();
                continue;
            }
            if upper {
                key.extend(c.to_uppercase());
                upper = false;
            } else {
                key.push(c);
            }
        }
        key.push_str("Version");
        key
    }
}

/// Dependencies and files of one generated module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleOutput {
    /// Gradle plugin ids applied by the module's build file, in catalog order
    pub plugins: Vec<String>,
    /// Gradle blocks appended to the module's build file
    pub build_config: Vec<String>,
    pub dependencies: Vec<ResolvedDependency>,
    /// path relative to the module directory → content
    pub files: BTreeMap<String, String>,
}

/// Complete in-memory description of a generated project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedProject {
    pub modules: BTreeMap<String, ModuleOutput>,
    /// Root build properties, e.g. `gdxVersion`
    pub properties: BTreeMap<String, String>,
    /// Repositories every module resolves from
    pub repositories: Vec<Repository>,
    /// Buildscript classpath entries for the applied plugins
    pub buildscript: Vec<String>,
}

impl GeneratedProject {
    pub fn module(&self, name: &str) -> Option<&ModuleOutput> {
        self.modules.get(name)
    }

    /// Deterministic YAML rendering, used for dry runs and snapshot comparisons.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Successful generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub project: GeneratedProject,
    /// Non-fatal findings, in the order they were raised
    pub diagnostics: Vec<Diagnostic>,
}

/// Generates projects from selections. Cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct ProjectGenerator {
    catalog: Arc<Catalog>,
    templates: Arc<TemplateCatalog>,
    generator_version: String,
}

impl ProjectGenerator {
    pub fn new(
        catalog: Arc<Catalog>,
        templates: Arc<TemplateCatalog>,
        generator_version: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            templates,
            generator_version: generator_version.into(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn templates(&self) -> &TemplateCatalog {
        &self.templates
    }

    pub fn generate(&self, selection: &SelectionModel) -> Result<Generated> {
        selection.validate(&self.catalog)?;

        let resolution = DependencyResolver::new(&self.catalog).resolve(selection)?;
        let mut diagnostics = resolution.diagnostics;

        let versions = self.build_versions(selection)?;
        let placeholders = placeholders(selection, &versions);

        let template = self
            .templates
            .get(selection.template())
            .ok_or_else(|| GenerationError::UnknownTemplate {
                id: selection.template().to_string(),
            })?;
        if let Some(required) = &template.version {
            if requires_newer(&self.generator_version, required) {
                diagnostics.push(Diagnostic::TemplateVersionAhead {
                    template: template.id.clone(),
                    required: required.clone(),
                    running: self.generator_version.clone(),
                });
            }
        }

        let output = TemplateApplier::new(&self.templates).apply(
            selection.template(),
            &resolution.modules,
            &placeholders,
        )?;
        diagnostics.extend(output.diagnostics);

        let mut modules: BTreeMap<String, ModuleOutput> = resolution
            .modules
            .iter()
            .map(|name| (name.clone(), ModuleOutput::default()))
            .collect();
        for (name, dependencies) in resolution.dependencies {
            modules.entry(name).or_default().dependencies = dependencies;
        }
        for (name, files) in output.files {
            modules.entry(name).or_default().files = files;
        }
        let buildscript = self.apply_plugins(selection, &placeholders, &mut modules)?;

        let project = GeneratedProject {
            modules,
            properties: versions.properties(selection),
            repositories: self.catalog.repositories().to_vec(),
            buildscript,
        };
        self.check_modules(selection, &project)?;

        debug!(
            project = %selection.project_name(),
            modules = project.modules.len(),
            diagnostics = diagnostics.len(),
            "generated project"
        );

        Ok(Generated {
            project,
            diagnostics,
        })
    }

    fn build_versions(&self, selection: &SelectionModel) -> Result<BuildVersions> {
        let advanced = selection.advanced();
        let defaults = self.catalog.defaults();
        let android = selection.platforms().contains(&PlatformId::Android);
        let html = selection.platforms().contains(&PlatformId::Html);
        let policy = |explicit: &Option<String>| {
            VersionPolicy::explicit_or(explicit.as_deref(), Extremum::Latest)
        };

        let framework = advanced
            .framework_version
            .clone()
            .unwrap_or_else(|| self.catalog.framework_version().to_string());
        // GWT is only mandatory for web projects; other catalogs may list none
        let gwt_policy = policy(&advanced.gwt_version);
        let gwt = match resolve("GWT", self.catalog.gwt_versions(), &gwt_policy) {
            Err(GenerationError::EmptyVersionList { .. }) if !html => String::new(),
            resolved => resolved?,
        };
        parse_version(&framework)?;
        if html {
            parse_version(&gwt)?;
        }

        // Android versions are only resolved, and so only checked, for Android projects
        let (android_sdk, android_tools) = if android {
            let sdk = resolve(
                "Android API",
                std::slice::from_ref(&defaults.android_sdk_version),
                &policy(&advanced.android_sdk_version),
            )?;
            let tools = resolve(
                "Android build tools",
                std::slice::from_ref(&defaults.android_tools_version),
                &policy(&advanced.android_tools_version),
            )?;
            parse_version(&sdk)?;
            parse_version(&tools)?;
            (sdk, tools)
        } else {
            (String::new(), String::new())
        };

        Ok(BuildVersions {
            framework,
            gwt,
            android_sdk,
            android_tools,
        })
    }

    /// Applies the Gradle plugins of each module's selected platforms, once per plugin id, and
    /// returns the buildscript classpath they need.
    fn apply_plugins(
        &self,
        selection: &SelectionModel,
        placeholders: &Placeholders,
        modules: &mut BTreeMap<String, ModuleOutput>,
    ) -> Result<Vec<String>> {
        let matrix = self.catalog.matrix();
        let mut classpath: Vec<String> = Vec::new();

        for module_id in matrix.shared_modules_for(selection.platforms())? {
            if module_id == ModuleId::CORE {
                continue;
            }
            let name = &matrix.modules().get(module_id).name;
            let Some(output) = modules.get_mut(name) else {
                continue;
            };
            for platform in matrix.active_platforms(module_id, selection.platforms()) {
                for plugin in &self.catalog.platform(platform)?.plugins {
                    if output.plugins.contains(&plugin.id) {
                        continue;
                    }
                    output.plugins.push(plugin.id.clone());
                    if let Some(config) = &plugin.config {
                        let rendered = placeholders.substitute(config).map_err(|token| {
                            GenerationError::DanglingPlaceholder {
                                template: selection.template().to_string(),
                                module: name.clone(),
                                path: BUILD_FILE.to_string(),
                                token,
                            }
                        })?;
                        output.build_config.push(rendered);
                    }
                    if let Some(entry) = &plugin.classpath {
                        if !classpath.contains(entry) {
                            classpath.push(entry.clone());
                        }
                    }
                }
            }
        }

        Ok(classpath)
    }

    /// Every module must be core or serve at least one selected platform.
    fn check_modules(&self, selection: &SelectionModel, project: &GeneratedProject) -> Result<()> {
        let arena = self.catalog.matrix().modules();
        for name in project.modules.keys() {
            let outside = || GenerationError::ModuleOutsideSelection {
                module: name.clone(),
            };
            let id = arena.find(name).ok_or_else(outside)?;
            let module = arena.get(id);
            if !module.is_core() && !selection.platforms().iter().any(|p| module.serves(*p)) {
                return Err(outside());
            }
        }
        Ok(())
    }
}

struct BuildVersions {
    framework: String,
    gwt: String,
    android_sdk: String,
    android_tools: String,
}

impl BuildVersions {
    /// Root properties. Platform-specific versions appear only when that platform is selected.
    fn properties(&self, selection: &SelectionModel) -> BTreeMap<String, String> {
        let dialect = selection.dialect();
        let mut properties = BTreeMap::new();
        properties.insert(keys::APP_NAME.to_string(), selection.project_name().to_string());
        properties.insert(keys::GDX_VERSION.to_string(), self.framework.clone());
        properties.insert(keys::version_key(&dialect.id), dialect.version.clone());

        for (id, version) in &selection.advanced().extension_versions {
            if selection.extensions().contains(id) {
                properties.insert(keys::version_key(id), version.clone());
            }
        }

        if selection.platforms().contains(&PlatformId::Android) {
            properties.insert(
                keys::ANDROID_SDK_VERSION.to_string(),
                self.android_sdk.clone(),
            );
            properties.insert(
                keys::ANDROID_TOOLS_VERSION.to_string(),
                self.android_tools.clone(),
            );
        }
        if selection.platforms().contains(&PlatformId::Html) {
            properties.insert(keys::GWT_VERSION.to_string(), self.gwt.clone());
        }
        properties
    }
}

fn placeholders(selection: &SelectionModel, versions: &BuildVersions) -> Placeholders {
    let dialect = selection.dialect();
    let mut placeholders = Placeholders::new();
    placeholders
        .insert("PROJECT_NAME", selection.project_name())
        .insert("PACKAGE", selection.package_name())
        .insert("PACKAGE_PATH", selection.package_name().replace('.', "/"))
        .insert("MAIN_CLASS", selection.main_class())
        .insert("GDX_VERSION", versions.framework.as_str())
        .insert("DIALECT", dialect.id.as_str())
        .insert("DIALECT_VERSION", dialect.version.as_str())
        .insert("ANDROID_SDK_VERSION", versions.android_sdk.as_str())
        .insert("ANDROID_TOOLS_VERSION", versions.android_tools.as_str())
        .insert("GWT_VERSION", versions.gwt.as_str());
    placeholders
}
