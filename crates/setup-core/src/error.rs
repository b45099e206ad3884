//! Generation errors and non-fatal diagnostics

use serde::Serialize;
use std::fmt;

/// Fatal errors raised while resolving or generating a project.
///
/// Every variant names the ids involved so a caller can point the user at the exact selection to
/// change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// An id referenced by a lookup is not registered in the catalog.
    #[error("unknown {kind}: '{id}'")]
    UnknownEntity { kind: EntityKind, id: String },

    /// An extremum was requested from an empty candidate list.
    #[error("no {what} versions available to choose from")]
    EmptyVersionList { what: String },

    /// A version string could not be ordered semantically.
    #[error("invalid version '{version}'")]
    InvalidVersion { version: String },

    /// A selected platform requires a newer dialect version than the one chosen.
    #[error(
        "platform '{platform}' requires {dialect} {required} or newer (selected {selected})"
    )]
    IncompatibleDialectVersion {
        platform: String,
        dialect: String,
        required: String,
        selected: String,
    },

    /// The selected template is not registered.
    #[error("template '{id}' not found")]
    UnknownTemplate { id: String },

    /// A placeholder token survived substitution.
    #[error("unresolved placeholder {token} in {module}/{path} (template '{template}')")]
    DanglingPlaceholder {
        template: String,
        module: String,
        path: String,
        token: String,
    },

    /// A blueprint path leaves its module directory (`..`, an absolute path or a drive prefix).
    #[error("path '{path}' escapes module '{module}' (template '{template}')")]
    PathOutsideModule {
        template: String,
        module: String,
        path: String,
    },

    /// Two outputs land on the same file of a module.
    #[error("{module}/{path} is produced more than once (template '{template}')")]
    FileCollision {
        template: String,
        module: String,
        path: String,
    },

    /// Generated output references a module that the selection does not produce.
    #[error("module '{module}' is not part of the selected platforms")]
    ModuleOutsideSelection { module: String },
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Kind of catalog entry named by [`GenerationError::UnknownEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Platform,
    Module,
    Dialect,
    DialectVersion,
    Extension,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Platform => "platform",
            EntityKind::Module => "module",
            EntityKind::Dialect => "language dialect",
            EntityKind::DialectVersion => "dialect version",
            EntityKind::Extension => "extension",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GenerationError {
    pub(crate) fn unknown(kind: EntityKind, id: impl Into<String>) -> Self {
        GenerationError::UnknownEntity {
            kind,
            id: id.into(),
        }
    }
}

/// How loudly a diagnostic should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// Non-fatal findings attached to a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// The extension supports none of the selected platforms and was left out.
    NoApplicablePlatform { extension: String },

    /// The extension was added, but some selected platforms cannot use it.
    PartiallyApplicable {
        extension: String,
        unsupported: Vec<String>,
    },

    /// The template ships files for a module that is not being generated.
    MissingModuleBlueprint { template: String, module: String },

    /// The template was authored for a newer generator.
    TemplateVersionAhead {
        template: String,
        required: String,
        running: String,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::NoApplicablePlatform { .. } => Severity::Warning,
            Diagnostic::TemplateVersionAhead { .. } => Severity::Warning,
            Diagnostic::PartiallyApplicable { .. } => Severity::Info,
            Diagnostic::MissingModuleBlueprint { .. } => Severity::Info,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoApplicablePlatform { extension } => write!(
                f,
                "extension '{}' supports none of the selected platforms and was skipped",
                extension
            ),
            Diagnostic::PartiallyApplicable {
                extension,
                unsupported,
            } => write!(
                f,
                "extension '{}' is not available on: {}",
                extension,
                unsupported.join(", ")
            ),
            Diagnostic::MissingModuleBlueprint { template, module } => write!(
                f,
                "template '{}' has files for '{}', which is not selected",
                template, module
            ),
            Diagnostic::TemplateVersionAhead {
                template,
                required,
                running,
            } => write!(
                f,
                "template '{}' was designed for generator {} or newer (running {})",
                template, required, running
            ),
        }
    }
}
