//! Setup Core - project generation engine for multi-platform game skeletons
//!
//! This library turns a set of user choices (platforms, language dialect, extensions, starter
//! template) into a coherent multi-module Gradle project, or rejects the combination with a
//! diagnostic naming the offending ids.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Catalog** - Compatibility matrix, dialects, extensions and version resolution
//! - **Layer 2: Generation** - `SelectionBuilder`, `DependencyResolver`, `TemplateApplier` and
//!   `ProjectGenerator`, all pure and side-effect free
//! - **Layer 3: I/O** - Project writers, preference stores and template loading
//! - **Layer 4: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use setup_core::{Catalog, PlatformId, ProjectGenerator, SelectionModel, TemplateCatalog};
//! use std::sync::Arc;
//!
//! let generator = ProjectGenerator::new(
//!     Arc::new(Catalog::builtin()?),
//!     Arc::new(TemplateCatalog::builtin()),
//!     env!("CARGO_PKG_VERSION"),
//! );
//! let selection = SelectionModel::builder("demo")
//!     .platform(PlatformId::Desktop)
//!     .extension("box2d")
//!     .build()?;
//! let generated = generator.generate(&selection)?;
//! ```

pub mod catalog;
pub mod error;
pub mod prefs;
pub mod product;
pub mod project;
pub mod resolve;
pub mod selection;
pub mod templates;
pub mod version;
pub mod writer;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use catalog::{Catalog, CompatibilityMatrix, DisplayLists, Repository};
pub use error::{Diagnostic, GenerationError, Severity};
pub use prefs::{MemoryPreferences, PreferenceStore, SdkPreferences, YamlPreferences};
pub use product::ProductConfig;
pub use project::{GeneratedProject, Generated, ProjectGenerator};
pub use resolve::{DependencyResolver, ResolvedDependency};
pub use selection::{PlatformId, SelectionBuilder, SelectionModel};
pub use templates::{TemplateCatalog, TemplateSource};
pub use version::{Extremum, VersionPolicy};
pub use writer::{write_project, FsWriter, MemoryWriter, ProjectWriter};

#[cfg(feature = "tui")]
pub use tui::run;
