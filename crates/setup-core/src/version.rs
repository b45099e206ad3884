//! Version ordering, extremum resolution and artifact coordinates
//!
//! Versions are compared semantically: numeric `major.minor.patch` with missing components read as
//! zero (`27` == `27.0.0`), and pre-release suffixes sorting before their release
//! (`2.8.0-beta1` < `2.8.0`).

use crate::catalog::{ArtifactId, Extension};
use crate::error::{GenerationError, Result};
use semver::Version;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Which end of a version list to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Latest,
    Oldest,
}

/// How a concrete version is chosen from a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPolicy {
    Latest,
    Oldest,
    /// User-supplied version; never replaced by a computed one.
    Explicit(String),
}

impl VersionPolicy {
    /// The explicit version when there is one, otherwise `fallback`.
    pub fn explicit_or(explicit: Option<&str>, fallback: Extremum) -> Self {
        match explicit {
            Some(version) => VersionPolicy::Explicit(version.to_string()),
            None => fallback.into(),
        }
    }
}

impl From<Extremum> for VersionPolicy {
    fn from(which: Extremum) -> Self {
        match which {
            Extremum::Latest => VersionPolicy::Latest,
            Extremum::Oldest => VersionPolicy::Oldest,
        }
    }
}

/// Parse version text leniently into a semver version.
///
/// Accepts an optional leading `v`, one to three numeric components and an optional
/// `-pre.release` / `+build` tail.
pub fn parse_version(version_str: &str) -> Result<Version> {
    let invalid = || GenerationError::InvalidVersion {
        version: version_str.to_string(),
    };

    let trimmed = version_str.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let split_at = cleaned
        .find(|c| c == '-' || c == '+')
        .unwrap_or(cleaned.len());
    let (numeric, tail) = cleaned.split_at(split_at);

    let parts: Vec<&str> = numeric.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(invalid());
    }
    let mut components = [0u64; 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        *slot = part.parse().map_err(|_| invalid())?;
    }

    let normalized = format!(
        "{}.{}.{}{}",
        components[0], components[1], components[2], tail
    );
    Version::parse(&normalized).map_err(|_| invalid())
}

/// Total, deterministic ordering of two version strings.
///
/// Versions equal under semantic ordering (`1.3` and `1.3.0`) are ordered by their raw text.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    let parsed_a = parse_version(a)?;
    let parsed_b = parse_version(b)?;
    Ok(parsed_a.cmp(&parsed_b).then_with(|| a.cmp(b)))
}

/// Pick the newest or oldest version from `versions`.
///
/// `what` names the list in the `EmptyVersionList` error.
pub fn resolve_extremum<'a, V: AsRef<str>>(
    what: &str,
    versions: &'a [V],
    which: Extremum,
) -> Result<&'a V> {
    let mut best: Option<(&'a V, Version)> = None;
    for candidate in versions {
        let parsed = parse_version(candidate.as_ref())?;
        let replace = match &best {
            None => true,
            Some((current, current_parsed)) => {
                let ordering = parsed
                    .cmp(current_parsed)
                    .then_with(|| candidate.as_ref().cmp(current.as_ref()));
                match which {
                    Extremum::Latest => ordering == Ordering::Greater,
                    Extremum::Oldest => ordering == Ordering::Less,
                }
            }
        };
        if replace {
            best = Some((candidate, parsed));
        }
    }

    best.map(|(v, _)| v)
        .ok_or_else(|| GenerationError::EmptyVersionList {
            what: what.to_string(),
        })
}

/// Resolve a policy against a candidate list. Explicit versions are returned as given, without
/// consulting the list.
pub fn resolve(what: &str, versions: &[String], policy: &VersionPolicy) -> Result<String> {
    match policy {
        VersionPolicy::Explicit(version) => Ok(version.clone()),
        VersionPolicy::Latest => resolve_extremum(what, versions, Extremum::Latest).cloned(),
        VersionPolicy::Oldest => resolve_extremum(what, versions, Extremum::Oldest).cloned(),
    }
}

/// Returns true when a template requires a newer generator than the one running.
/// Unparseable versions never warn.
pub fn requires_newer(running: &str, required: &str) -> bool {
    match (parse_version(running), parse_version(required)) {
        (Ok(running), Ok(required)) => running < required,
        _ => false,
    }
}

/// Where an extension version came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChoice {
    /// Set by the user in the advanced overrides
    Explicit(String),
    /// The extension's catalog default (or the framework version for official extensions)
    Catalog(String),
}

/// A concrete, versioned artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactCoordinate {
    pub artifact: ArtifactId,
    pub version: String,
}

impl ArtifactCoordinate {
    /// Gradle notation: `group:name:version[:classifier]`.
    pub fn notation(&self) -> String {
        match &self.artifact.classifier {
            Some(classifier) => format!(
                "{}:{}:{}:{}",
                self.artifact.group, self.artifact.name, self.version, classifier
            ),
            None => format!(
                "{}:{}:{}",
                self.artifact.group, self.artifact.name, self.version
            ),
        }
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

/// Artifact coordinate an extension contributes to `module`.
///
/// Module-specific catalog entries replace the base artifact and, unless the user chose the
/// version explicitly, the version.
pub fn coordinate_for(
    extension: &Extension,
    module: &str,
    version: &VersionChoice,
) -> ArtifactCoordinate {
    let module_override = extension.modules.get(module);

    let artifact = module_override
        .and_then(|o| o.artifact.clone())
        .unwrap_or_else(|| extension.artifact.clone());

    let version = match version {
        VersionChoice::Explicit(v) => v.clone(),
        VersionChoice::Catalog(default) => module_override
            .and_then(|o| o.version.clone())
            .unwrap_or_else(|| default.clone()),
    };

    ArtifactCoordinate { artifact, version }
}
