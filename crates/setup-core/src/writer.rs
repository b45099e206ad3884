//! Writing a generated project
//!
//! Rendering of the Gradle build files lives here too, since they are derived purely from the
//! [`GeneratedProject`] and never pass through templates.

use crate::catalog::CORE_MODULE;
use crate::project::{GeneratedProject, ModuleOutput};
use crate::selection::SelectionModel;
use crate::templates::is_module_relative;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const BUILD_FILE: &str = "build.gradle";
pub const SETTINGS_FILE: &str = "settings.gradle";
pub const PROPERTIES_FILE: &str = "gradle.properties";
pub const LOCAL_PROPERTIES_FILE: &str = "local.properties";

/// Sink for generated files. Paths are relative to the project root.
#[allow(async_fn_in_trait)]
pub trait ProjectWriter {
    async fn write_file(&mut self, path: &Path, content: &str) -> Result<()>;
}

/// Writes below a root directory, creating parent directories as needed.
#[derive(Debug, Clone)]
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProjectWriter for FsWriter {
    async fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        let target_path = self.root.join(path);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&target_path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))
    }
}

/// Collects files in memory; used for dry runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryWriter {
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectWriter for MemoryWriter {
    async fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        self.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

/// Renders a module's `build.gradle`.
///
/// Core is a `java-library` exposing its dependencies to the platform modules through `api`;
/// every other module applies its platform plugins (plain `java` when it has none) and depends on
/// core.
pub fn render_build_descriptor(name: &str, module: &ModuleOutput) -> String {
    let is_core = name == CORE_MODULE;
    let configuration = if is_core { "api" } else { "implementation" };

    let mut out = String::new();
    if is_core {
        out.push_str("apply plugin: 'java-library'\n");
    } else if module.plugins.is_empty() {
        out.push_str("apply plugin: 'java'\n");
    } else {
        for plugin in &module.plugins {
            out.push_str(&format!("apply plugin: '{}'\n", plugin));
        }
    }

    out.push_str("\ndependencies {\n");
    if !is_core {
        out.push_str(&format!("    implementation project(':{}')\n", CORE_MODULE));
    }
    for dependency in &module.dependencies {
        out.push_str(&format!(
            "    {} \"{}\"\n",
            configuration,
            dependency.notation()
        ));
    }
    out.push_str("}\n");

    for block in &module.build_config {
        out.push('\n');
        out.push_str(block);
        if !block.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Renders the root `build.gradle`: plugin classpath and the repositories shared by all modules.
pub fn render_root_build(project: &GeneratedProject) -> String {
    let repositories: String = project
        .repositories
        .iter()
        .map(|repo| format!("        {}\n", repo.gradle()))
        .collect();

    let mut out = String::from("buildscript {\n    repositories {\n");
    out.push_str(&repositories);
    out.push_str("    }\n");
    if !project.buildscript.is_empty() {
        out.push_str("    dependencies {\n");
        for entry in &project.buildscript {
            out.push_str(&format!("        classpath '{}'\n", entry));
        }
        out.push_str("    }\n");
    }
    out.push_str("}\n\nallprojects {\n    version = '1.0'\n    repositories {\n");
    out.push_str(&repositories);
    out.push_str("    }\n}\n");
    out
}

/// Renders `settings.gradle`, including every generated module.
pub fn render_settings(project: &GeneratedProject) -> String {
    let includes: Vec<String> = project
        .modules
        .keys()
        .map(|name| format!("'{}'", name))
        .collect();
    format!("include {}\n", includes.join(", "))
}

/// Renders `gradle.properties` from the project's build properties.
pub fn render_properties(project: &GeneratedProject) -> String {
    let mut out = String::from("org.gradle.daemon=true\norg.gradle.jvmargs=-Xms128m -Xmx512m\n");
    for (key, value) in &project.properties {
        out.push_str(&format!("{}={}\n", key, value));
    }
    out
}

/// Renders `local.properties` when an Android SDK location was chosen.
pub fn render_local_properties(selection: &SelectionModel) -> Option<String> {
    selection.android_sdk_path().map(|path| {
        // Backslashes and colons must be escaped in Java properties files
        let escaped = path
            .display()
            .to_string()
            .replace('\\', "\\\\")
            .replace(':', "\\:");
        format!("sdk.dir={}\n", escaped)
    })
}

/// Writes every module file, the per-module build files and the root Gradle files.
///
/// Returns the written paths relative to the project root, in write order.
pub async fn write_project<W: ProjectWriter>(
    writer: &mut W,
    project: &GeneratedProject,
    selection: &SelectionModel,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (name, module) in &project.modules {
        anyhow::ensure!(
            is_module_relative(name) && !name.contains(['/', '\\']),
            "Module name '{}' is not a single directory",
            name
        );
        let module_dir = Path::new(name);
        for (path, content) in &module.files {
            anyhow::ensure!(
                is_module_relative(path),
                "File '{}' escapes module '{}'",
                path,
                name
            );
            anyhow::ensure!(
                Path::new(path) != Path::new(BUILD_FILE),
                "File '{}/{}' would overwrite the generated build file",
                name,
                path
            );
            let target = module_dir.join(path);
            writer.write_file(&target, content).await?;
            written.push(target);
        }

        let build_file = module_dir.join(BUILD_FILE);
        writer
            .write_file(&build_file, &render_build_descriptor(name, module))
            .await?;
        written.push(build_file);
    }

    let root_files = [
        (BUILD_FILE, Some(render_root_build(project))),
        (SETTINGS_FILE, Some(render_settings(project))),
        (PROPERTIES_FILE, Some(render_properties(project))),
        (LOCAL_PROPERTIES_FILE, render_local_properties(selection)),
    ];
    for (name, content) in root_files {
        if let Some(content) = content {
            let path = PathBuf::from(name);
            writer.write_file(&path, &content).await?;
            written.push(path);
        }
    }

    Ok(written)
}
