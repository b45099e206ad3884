//! Product configuration trait for CLI binaries
//!
//! A front end implements this trait to name itself and to point the shared generator at its
//! catalog overrides, documentation and post-generation instructions.

use crate::selection::PlatformId;
use std::collections::BTreeSet;
use std::path::Path;

/// Configuration trait for setup front ends
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Environment variables overriding the catalog and templates
/// - Documentation links
/// - Post-generation instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Environment variable naming a catalog YAML file to use instead of the built-in one
    fn catalog_env(&self) -> &'static str;

    /// Environment variable naming a template directory or zip bundle
    fn template_dir_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, platforms: &BTreeSet<PlatformId>) -> Vec<String>;
}
