//! Module graph construction.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{IacError, IacResult};
use crate::model::{Module, ModulePath};
use crate::parser;
use crate::path;

/// Child module -> modules that reference it.
pub type ParentIndex = HashMap<ModulePath, Vec<ModulePath>>;

/// Parse every directory below `base` (inclusive), in lexical walk order.
pub fn parse_base_dir(base: impl AsRef<Path>) -> IacResult<Vec<Module>> {
    let base = path::absolute(base.as_ref())?;
    if !base.is_dir() {
        return Err(IacError::BaseDirNotFound(base));
    }

    let mut modules = Vec::new();
    for entry in WalkDir::new(&base).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(module) = parser::parse_dir(entry.path())? {
            modules.push(module);
        }
    }

    info!(base = %base.display(), modules = modules.len(), "Parsed module tree");
    Ok(modules)
}

/// Index every module reference by the directory it resolves to.
///
/// Sources are joined to the referencing module's path lexically, so
/// references to directories that were never parsed are kept too.
pub fn build_parent_index(modules: &[Module]) -> ParentIndex {
    let mut index = ParentIndex::new();
    for module in modules {
        for reference in module.module_refs() {
            let child = module.path.join_source(&reference.source);
            debug!(parent = %module.path, child = %child, "Module reference");
            index.entry(child).or_default().push(module.path.clone());
        }
    }
    index
}

/// Parsed modules keyed by path, plus the derived parent index.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    modules: BTreeMap<ModulePath, Module>,
    parents: ParentIndex,
}

impl ModuleGraph {
    pub fn new(modules: Vec<Module>) -> Self {
        let parents = build_parent_index(&modules);
        let modules = modules
            .into_iter()
            .map(|m| (m.path.clone(), m))
            .collect();
        Self { modules, parents }
    }

    /// Parse `base` and build the graph in one step.
    pub fn from_base_dir(base: impl AsRef<Path>) -> IacResult<Self> {
        Ok(Self::new(parse_base_dir(base)?))
    }

    pub fn get(&self, path: &ModulePath) -> Option<&Module> {
        self.modules.get(path)
    }

    /// All modules, sorted by path.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Root modules, sorted by path.
    pub fn roots(&self) -> Vec<&Module> {
        self.modules.values().filter(|m| m.is_root).collect()
    }

    pub fn parents_of(&self, path: &ModulePath) -> Option<&[ModulePath]> {
        self.parents.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
