//! Extension/platform compatibility, dialect minimums and the module arena

use super::manifest::{CatalogManifest, PlatformSupport};
use crate::error::{EntityKind, GenerationError, Result};
use crate::selection::PlatformId;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Name of the shared module every project gets.
pub const CORE_MODULE: &str = "core";

/// Index of a module in a [`ModuleArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(usize);

impl ModuleId {
    pub const CORE: ModuleId = ModuleId(0);
}

/// A generated build unit and the platforms it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    /// Empty for the core module, which serves every platform
    pub platforms: BTreeSet<PlatformId>,
}

impl Module {
    pub fn is_core(&self) -> bool {
        self.name == CORE_MODULE
    }

    pub fn serves(&self, platform: PlatformId) -> bool {
        self.is_core() || self.platforms.contains(&platform)
    }
}

/// All modules known to the catalog. The core module is always at [`ModuleId::CORE`].
#[derive(Debug, Clone)]
pub struct ModuleArena {
    modules: Vec<Module>,
    by_platform: BTreeMap<PlatformId, ModuleId>,
}

impl Default for ModuleArena {
    fn default() -> Self {
        Self {
            modules: vec![Module {
                name: CORE_MODULE.to_string(),
                platforms: BTreeSet::new(),
            }],
            by_platform: BTreeMap::new(),
        }
    }
}

impl ModuleArena {
    /// Registers `platform` as served by the module called `name`, creating it on first use.
    fn attach(&mut self, platform: PlatformId, name: &str) -> ModuleId {
        let id = match self.find(name) {
            Some(id) => id,
            None => {
                self.modules.push(Module {
                    name: name.to_string(),
                    platforms: BTreeSet::new(),
                });
                ModuleId(self.modules.len() - 1)
            }
        };
        self.modules[id.0].platforms.insert(platform);
        self.by_platform.insert(platform, id);
        id
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn find(&self, name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .position(|m| m.name == name)
            .map(ModuleId)
    }

    pub fn module_for(&self, platform: PlatformId) -> Option<ModuleId> {
        self.by_platform.get(&platform).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(idx, m)| (ModuleId(idx), m))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlatformEntry {
    pub module: Option<ModuleId>,
    pub min_dialect_versions: BTreeMap<String, String>,
}

/// Read-only lookup tables answering which extension runs where and which dialect versions each
/// platform needs.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityMatrix {
    platforms: BTreeMap<PlatformId, PlatformEntry>,
    extensions: HashMap<String, PlatformSupport>,
    dialects: BTreeSet<String>,
    modules: ModuleArena,
}

impl CompatibilityMatrix {
    pub(crate) fn from_manifest(manifest: &CatalogManifest) -> Self {
        let mut matrix = CompatibilityMatrix::default();

        for def in &manifest.platforms {
            let module = matrix.modules.attach(def.id, def.module_name());
            matrix.platforms.insert(
                def.id,
                PlatformEntry {
                    module: Some(module),
                    min_dialect_versions: def.min_dialect_versions.clone(),
                },
            );
        }
        for dialect in &manifest.dialects {
            matrix.dialects.insert(dialect.id.clone());
        }
        for ext in &manifest.extensions {
            matrix
                .extensions
                .insert(ext.id.clone(), ext.platforms.clone());
        }

        matrix
    }

    pub fn modules(&self) -> &ModuleArena {
        &self.modules
    }

    pub fn platform(&self, platform: PlatformId) -> Result<&PlatformEntry> {
        self.platforms
            .get(&platform)
            .ok_or_else(|| GenerationError::unknown(EntityKind::Platform, platform.as_str()))
    }

    /// Platforms registered in the catalog, in id order.
    pub fn platforms(&self) -> impl Iterator<Item = PlatformId> + '_ {
        self.platforms.keys().copied()
    }

    pub fn is_compatible(&self, extension_id: &str, platform: PlatformId) -> Result<bool> {
        self.platform(platform)?;
        let support = self
            .extensions
            .get(extension_id)
            .ok_or_else(|| GenerationError::unknown(EntityKind::Extension, extension_id))?;
        Ok(support.supports(platform))
    }

    /// Minimum dialect version the platform's toolchain requires, if it constrains the dialect.
    pub fn min_dialect_version(
        &self,
        platform: PlatformId,
        dialect_id: &str,
    ) -> Result<Option<&str>> {
        let entry = self.platform(platform)?;
        if !self.dialects.contains(dialect_id) {
            return Err(GenerationError::unknown(EntityKind::Dialect, dialect_id));
        }
        Ok(entry
            .min_dialect_versions
            .get(dialect_id)
            .map(String::as_str))
    }

    /// Modules needed for `platforms`: core plus one module per distinct serving module.
    /// Platforms sharing a module add it once.
    pub fn shared_modules_for(
        &self,
        platforms: &BTreeSet<PlatformId>,
    ) -> Result<BTreeSet<ModuleId>> {
        let mut modules = BTreeSet::from([ModuleId::CORE]);
        for platform in platforms {
            if let Some(module) = self.platform(*platform)?.module {
                modules.insert(module);
            }
        }
        Ok(modules)
    }

    /// Selected platforms a module serves.
    pub fn active_platforms(
        &self,
        module: ModuleId,
        selected: &BTreeSet<PlatformId>,
    ) -> BTreeSet<PlatformId> {
        let module = self.modules.get(module);
        selected
            .iter()
            .copied()
            .filter(|p| module.serves(*p))
            .collect()
    }
}
