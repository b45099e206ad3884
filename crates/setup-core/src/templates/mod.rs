//! Starter templates: catalog, loading, packing and application
//!
//! This module provides:
//! - Template manifest types (RootManifest, TemplateManifest)
//! - Loading from the built-in set, local directories and zip bundles
//! - `%TOKEN%` placeholder substitution
//! - Applying a template to a resolved module set

pub mod apply;
pub mod builtin;
pub mod loader;
pub mod manifest;
pub mod placeholder;

use crate::product::ProductConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use apply::{is_module_relative, TemplateApplier, TemplateOutput};
pub use loader::{
    build_local_zip, build_zip, extract_zip, load_template_dir, read_root_manifest, TemplateSource,
};
pub use manifest::{RootManifest, TemplateManifest};
pub use placeholder::Placeholders;

/// One file of a template, before substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlueprint {
    /// Path relative to the module directory
    pub path: String,
    pub content: String,
}

/// A named starter-code blueprint applied across modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Oldest generator version able to apply this template
    pub version: Option<String>,
    /// Blueprints per module name
    pub blueprints: BTreeMap<String, Vec<FileBlueprint>>,
}

impl Template {
    /// Manifest listing every blueprint explicitly
    pub fn manifest(&self) -> TemplateManifest {
        TemplateManifest {
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            files: self
                .blueprints
                .iter()
                .map(|(module, files)| {
                    (
                        module.clone(),
                        files.iter().map(|f| f.path.clone()).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Registered templates by id. Loaded once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,
}

impl TemplateCatalog {
    pub fn builtin() -> Self {
        builtin::templates()
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Adds every template of `other`, replacing templates with the same id.
    pub fn extend(&mut self, other: TemplateCatalog) {
        self.templates.extend(other.templates);
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    /// Template ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }
}

/// Build zip files for all templates in a directory
pub fn build_zips<C: ProductConfig>(config: &C, template_dir: &Option<PathBuf>) -> Result<()> {
    let dir = template_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("templates"));

    if !dir.exists() {
        anyhow::bail!("Template directory not found: {}", dir.display());
    }

    let root_manifest = loader::read_root_manifest(&dir)?;

    println!(
        "{}",
        format!("Building {} template zips...", config.display_name())
            .cyan()
            .bold()
    );
    println!();

    let mut built = 0;
    for template_name in &root_manifest.templates {
        let template_path = dir.join(template_name);
        if !template_path.exists() {
            eprintln!(
                "{} Template directory not found: {}",
                "Warning:".yellow(),
                template_path.display()
            );
            continue;
        }

        print!("  {} {}...", "->".blue(), template_name);

        match build_local_zip(&dir, template_name) {
            Ok(zip_bytes) => {
                let zip_path = dir.join(format!("{}.zip", template_name));
                std::fs::write(&zip_path, &zip_bytes)
                    .with_context(|| format!("Failed to write {}", zip_path.display()))?;
                println!(" {} ({} bytes)", "done".green(), zip_bytes.len());
                built += 1;
            }
            Err(e) => {
                println!(" {}", "failed".red());
                eprintln!("    Error: {:#}", e);
            }
        }
    }

    println!();
    println!(
        "{} {} template zip(s) in {}",
        "Built".green().bold(),
        built,
        dir.display()
    );

    Ok(())
}
