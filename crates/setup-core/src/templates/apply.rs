//! Applying a template to a resolved module set

use super::placeholder::Placeholders;
use super::TemplateCatalog;
use crate::error::{Diagnostic, GenerationError, Result};
use crate::writer::BUILD_FILE;
use std::collections::BTreeMap;
use std::path::{Component, Path};
use tracing::warn;

/// True when `path` is non-empty and stays below the directory it is joined to.
pub fn is_module_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Substituted files per module, plus skipped-blueprint diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateOutput {
    /// module → path → content
    pub files: BTreeMap<String, BTreeMap<String, String>>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct TemplateApplier<'a> {
    templates: &'a TemplateCatalog,
}

impl<'a> TemplateApplier<'a> {
    pub fn new(templates: &'a TemplateCatalog) -> Self {
        Self { templates }
    }

    /// Substitute the template's blueprints for every module in `modules`.
    ///
    /// Blueprints for modules outside the set are skipped with a `MissingModuleBlueprint`
    /// diagnostic. A token without a value fails with `DanglingPlaceholder`. Substituted paths must
    /// stay inside their module and be unique there; the module's build file is generated and
    /// cannot come from a blueprint.
    pub fn apply(
        &self,
        template_id: &str,
        modules: &[String],
        placeholders: &Placeholders,
    ) -> Result<TemplateOutput> {
        let template =
            self.templates
                .get(template_id)
                .ok_or_else(|| GenerationError::UnknownTemplate {
                    id: template_id.to_string(),
                })?;

        let mut output = TemplateOutput::default();

        for (module, blueprints) in &template.blueprints {
            if !modules.contains(module) {
                warn!(template = %template_id, module = %module, "skipping blueprint for unselected module");
                output.diagnostics.push(Diagnostic::MissingModuleBlueprint {
                    template: template_id.to_string(),
                    module: module.clone(),
                });
                continue;
            }

            let files = output.files.entry(module.clone()).or_default();
            for blueprint in blueprints {
                let dangling = |token: String| GenerationError::DanglingPlaceholder {
                    template: template_id.to_string(),
                    module: module.clone(),
                    path: blueprint.path.clone(),
                    token,
                };
                let path = placeholders.substitute(&blueprint.path).map_err(dangling)?;
                if !is_module_relative(&path) {
                    return Err(GenerationError::PathOutsideModule {
                        template: template_id.to_string(),
                        module: module.clone(),
                        path,
                    });
                }
                let content = placeholders
                    .substitute(&blueprint.content)
                    .map_err(dangling)?;
                if Path::new(&path) == Path::new(BUILD_FILE) || files.contains_key(&path) {
                    return Err(GenerationError::FileCollision {
                        template: template_id.to_string(),
                        module: module.clone(),
                        path,
                    });
                }
                files.insert(path, content);
            }
        }

        Ok(output)
    }
}
