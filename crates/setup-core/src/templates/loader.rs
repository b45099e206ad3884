//! Template loading from the built-in set, local directories or zip bundles
//!
//! Directory and zip catalogs share one layout:
//! - `<name>/template.yaml`: the template manifest
//! - `<name>/<module>/<path>`: blueprint files, placeholders allowed in paths and contents
//!
//! A directory catalog additionally has a root `template.yaml` listing its templates; each entry is
//! read from `<name>/` when present, otherwise from `<name>.zip`.

use super::manifest::{RootManifest, TemplateManifest};
use super::{builtin, is_module_relative, FileBlueprint, Template, TemplateCatalog};
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const MANIFEST_FILE: &str = "template.yaml";

/// Template source - either the built-in set or a local directory / zip bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin,
    Local(PathBuf),
}

impl TemplateSource {
    /// Use the directory named by the product's environment variable, if set
    pub fn from_config<C: ProductConfig>(config: &C) -> Self {
        match std::env::var_os(config.template_dir_env()) {
            Some(path) if !path.is_empty() => Self::Local(PathBuf::from(path)),
            _ => Self::Builtin,
        }
    }

    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }

    /// Load the catalog. Local templates are layered over the built-in ones, replacing
    /// templates with the same id.
    pub fn load(&self) -> Result<TemplateCatalog> {
        let mut catalog = builtin::templates();
        if let TemplateSource::Local(path) = self {
            catalog.extend(load_local(path)?);
        }
        Ok(catalog)
    }
}

fn load_local(path: &Path) -> Result<TemplateCatalog> {
    if path.is_file() && path.extension().is_some_and(|e| e == "zip") {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid zip file name: {}", path.display()))?;
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let mut catalog = TemplateCatalog::default();
        catalog.insert(extract_zip(&bytes, name)?);
        return Ok(catalog);
    }

    let root = read_root_manifest(path)?;
    let mut catalog = TemplateCatalog::default();
    for name in &root.templates {
        let template_dir = path.join(name);
        let zip_path = path.join(format!("{}.zip", name));
        let template = if template_dir.is_dir() {
            load_template_dir(path, name)?
        } else if zip_path.is_file() {
            let bytes = std::fs::read(&zip_path)
                .with_context(|| format!("Failed to read {}", zip_path.display()))?;
            extract_zip(&bytes, name)?
        } else {
            anyhow::bail!(
                "Template '{}' listed in {} has neither a directory nor a zip",
                name,
                path.join(MANIFEST_FILE).display()
            );
        };
        catalog.insert(template);
    }
    Ok(catalog)
}

/// Read `<dir>/template.yaml`
pub fn read_root_manifest(dir: &Path) -> Result<RootManifest> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    serde_yaml::from_str(&content).context("Failed to parse root template.yaml")
}

/// Load `<dir>/<name>/` as a template
pub fn load_template_dir(dir: &Path, name: &str) -> Result<Template> {
    let template_path = dir.join(name);
    let manifest_path = template_path.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let manifest: TemplateManifest = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse template '{}' manifest", name))?;

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(&template_path).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("Failed to walk {}", template_path.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(&template_path)
            .context("Walked outside the template directory")?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key == MANIFEST_FILE {
            continue;
        }
        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        files.insert(key, bytes);
    }

    assemble(name, manifest, &files)
}

/// Build a template from its manifest and a `<module>/<path>` → bytes file table
fn assemble(
    name: &str,
    manifest: TemplateManifest,
    files: &BTreeMap<String, Vec<u8>>,
) -> Result<Template> {
    let mut blueprints = BTreeMap::new();

    for (module, listed) in &manifest.files {
        if !is_module_relative(module) || module.contains(['/', '\\']) {
            anyhow::bail!("Template '{}' names an invalid module '{}'", name, module);
        }
        let prefix = format!("{}/", module);
        let paths: Vec<String> = if listed.is_empty() {
            files
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix))
                .map(str::to_string)
                .collect()
        } else {
            listed.clone()
        };

        let mut module_files = Vec::new();
        for path in paths {
            if !is_module_relative(&path) {
                anyhow::bail!(
                    "Blueprint '{}' in template '{}' escapes module '{}'",
                    path,
                    name,
                    module
                );
            }
            let Some(bytes) = files.get(&format!("{}{}", prefix, path)) else {
                // Warn but don't fail - file might be optional
                warn!(template = %name, module = %module, path = %path, "blueprint file not found");
                continue;
            };
            let content = String::from_utf8(bytes.clone()).with_context(|| {
                format!(
                    "Blueprint {}/{} in template '{}' is not valid UTF-8",
                    module, path, name
                )
            })?;
            module_files.push(FileBlueprint { path, content });
        }
        blueprints.insert(module.clone(), module_files);
    }

    Ok(Template {
        id: name.to_string(),
        name: manifest.name,
        description: manifest.description,
        version: manifest.version,
        blueprints,
    })
}

/// Pack a template into a zip: `template.yaml` first (with every file listed explicitly),
/// then each blueprint under `<name>/<module>/<path>`
pub fn build_zip(template: &Template) -> Result<Vec<u8>> {
    let manifest_content =
        serde_yaml::to_string(&template.manifest()).context("Failed to serialize manifest")?;

    let mut zip_buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file(format!("{}/{}", template.id, MANIFEST_FILE), options)?;
        zip.write_all(manifest_content.as_bytes())?;

        for (module, files) in &template.blueprints {
            for file in files {
                zip.start_file(format!("{}/{}/{}", template.id, module, file.path), options)?;
                zip.write_all(file.content.as_bytes())?;
            }
        }

        zip.finish()?;
    }

    Ok(zip_buffer)
}

/// Build a zip for the template directory `<dir>/<name>/`
pub fn build_local_zip(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let template = load_template_dir(dir, name)?;
    build_zip(&template)
}

/// Read a template from zip bytes
pub fn extract_zip(zip_bytes: &[u8], template_name: &str) -> Result<Template> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes)).with_context(|| {
        format!(
            "Failed to read zip archive for template '{}'",
            template_name
        )
    })?;

    let mut files: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut manifest: Option<TemplateManifest> = None;

    // Entries look like {template_name}/module/file; strip the template prefix
    let prefix = format!("{}/", template_name);

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        if file.enclosed_name().is_none() {
            anyhow::bail!(
                "Template '{}' zip entry '{}' escapes the archive root",
                template_name,
                file.name()
            );
        }

        let full_path = file.name().to_string();
        let relative_path = full_path
            .strip_prefix(&prefix)
            .unwrap_or(&full_path)
            .to_string();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        if relative_path == MANIFEST_FILE {
            let content_str = String::from_utf8_lossy(&contents);
            manifest = Some(serde_yaml::from_str(&content_str).with_context(|| {
                format!("Failed to parse template '{}' manifest", template_name)
            })?);
            continue;
        }

        files.insert(relative_path, contents);
    }

    let manifest = manifest.ok_or_else(|| {
        anyhow::anyhow!("Template '{}' zip missing template.yaml", template_name)
    })?;

    assemble(template_name, manifest, &files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_catalog(root: &Path) {
        fs::write(root.join("template.yaml"), "templates:\n  - starter\n").unwrap();
        let template = root.join("starter");
        fs::create_dir_all(template.join("core/src/%PACKAGE_PATH%")).unwrap();
        fs::create_dir_all(template.join("desktop/src")).unwrap();
        fs::write(
            template.join("template.yaml"),
            "name: Starter\ndescription: Test template\nversion: \"0.1.0\"\nfiles:\n  core: []\n  desktop:\n    - src/Launcher.java\n",
        )
        .unwrap();
        fs::write(
            template.join("core/src/%PACKAGE_PATH%/%MAIN_CLASS%.java"),
            "package %PACKAGE%;\n",
        )
        .unwrap();
        fs::write(template.join("core/build.notes"), "notes\n").unwrap();
        fs::write(template.join("desktop/src/Launcher.java"), "class Launcher {}\n").unwrap();
        fs::write(template.join("desktop/src/Unlisted.java"), "ignored\n").unwrap();
    }

    #[test]
    fn test_load_template_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let template = load_template_dir(dir.path(), "starter").unwrap();
        assert_eq!(template.name, "Starter");
        let core: Vec<&str> = template.blueprints["core"]
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(core, vec!["build.notes", "src/%PACKAGE_PATH%/%MAIN_CLASS%.java"]);
        let desktop: Vec<&str> = template.blueprints["desktop"]
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(desktop, vec!["src/Launcher.java"]);
    }

    #[test]
    fn test_zip_matches_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let from_dir = load_template_dir(dir.path(), "starter").unwrap();
        let zip = build_local_zip(dir.path(), "starter").unwrap();
        let from_zip = extract_zip(&zip, "starter").unwrap();
        assert_eq!(from_dir, from_zip);
    }

    #[test]
    fn test_local_source_layers_over_builtin() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let catalog = TemplateSource::local(dir.path().to_path_buf())
            .load()
            .unwrap();
        assert!(catalog.get("starter").is_some());
        assert!(catalog.get("basic").is_some());
    }

    #[test]
    fn test_zip_catalog_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let zip = build_local_zip(dir.path(), "starter").unwrap();
        fs::remove_dir_all(dir.path().join("starter")).unwrap();
        fs::write(dir.path().join("starter.zip"), zip).unwrap();

        let catalog = load_local(dir.path()).unwrap();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["starter"]);
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("template.yaml"), "templates:\n  - ghost\n").unwrap();
        assert!(load_local(dir.path()).is_err());
    }

    #[test]
    fn test_listed_blueprint_outside_module_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        fs::write(
            dir.path().join("starter/template.yaml"),
            "name: Starter\ndescription: Test\nfiles:\n  core:\n    - ../desktop/src/Launcher.java\n",
        )
        .unwrap();

        let err = load_template_dir(dir.path(), "starter").unwrap_err();
        assert!(format!("{:#}", err).contains("escapes module 'core'"));
    }

    #[test]
    fn test_zip_entry_outside_root_is_rejected() {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            zip.start_file("starter/template.yaml", options).unwrap();
            zip.write_all(b"name: Starter\ndescription: Test\nfiles:\n  core: []\n")
                .unwrap();
            zip.start_file("../../evil.txt", options).unwrap();
            zip.write_all(b"evil").unwrap();
            zip.finish().unwrap();
        }
        let err = extract_zip(&buffer, "starter").unwrap_err();
        assert!(format!("{:#}", err).contains("escapes the archive root"));
    }

    #[test]
    fn test_zip_without_manifest() {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            zip.start_file("starter/core/Main.java", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"class Main {}").unwrap();
            zip.finish().unwrap();
        }
        assert!(extract_zip(&buffer, "starter").is_err());
    }
}
