//! Change-impact resolution.
//!
//! A changed file affects the module of its directory, and through the parent
//! index every root module that transitively references it.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::graph::ModuleGraph;
use crate::model::{Module, ModulePath};
use crate::path;

impl ModuleGraph {
    /// Root modules affected by any of `changed_files` (absolute paths),
    /// sorted by path and without duplicates.
    pub fn impacted_roots(&self, changed_files: &[PathBuf]) -> Vec<&Module> {
        let mut impacted: BTreeMap<&ModulePath, &Module> = BTreeMap::new();

        for changed in changed_files {
            let dir = changed.parent().unwrap_or_else(|| Path::new("/"));
            let target = ModulePath::new(path::normalize(dir));

            let mut visited = HashSet::new();
            let mut found = Vec::new();
            self.search(&target, &mut visited, &mut found);

            debug!(file = %changed.display(), roots = found.len(), "Resolved changed file");
            for module in found {
                impacted.insert(&module.path, module);
            }
        }

        impacted.into_values().collect()
    }

    fn search<'a>(
        &'a self,
        target: &ModulePath,
        visited: &mut HashSet<ModulePath>,
        found: &mut Vec<&'a Module>,
    ) {
        if !visited.insert(target.clone()) {
            return;
        }

        let Some(module) = self.get(target) else {
            return;
        };

        if module.is_root {
            found.push(module);
            return;
        }

        if let Some(parents) = self.parents_of(target) {
            for parent in parents {
                self.search(parent, visited, found);
            }
        }
    }
}
