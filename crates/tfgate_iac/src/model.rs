//! Terraform configuration model.
//!
//! Only the structural subset needed for dependency tracking and backend
//! policy is represented: `terraform { backend "<kind>" {} }`,
//! `provider "<name>" {}` and `module "<name>" { source = ... }`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name whose presence marks a directory as a root module.
pub const LOCK_FILE_NAME: &str = ".terraform.lock.hcl";

/// Extension of configuration files.
pub const CONFIG_EXTENSION: &str = "tf";

/// Absolute, lexically normalized directory of a module. Used as its key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModulePath(PathBuf);

impl ModulePath {
    /// Wrap a path that is already absolute and normalized.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Lexically resolve a relative module source against this module.
    pub fn join_source(&self, source: &str) -> ModulePath {
        ModulePath(crate::path::normalize(&self.0.join(source)))
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for ModulePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for ModulePath {
    fn from(value: &str) -> Self {
        Self(PathBuf::from(value))
    }
}

/// `backend "<kind>" { ... }` inside a `terraform` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub kind: String,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
}

/// A `terraform { ... }` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformBlock {
    pub backend: Option<Backend>,
}

/// `provider "<name>" { project = ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub project: Option<String>,
}

/// `module "<name>" { source = ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRef {
    pub name: String,
    pub source: String,
}

/// One parsed `.tf` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: PathBuf,
    pub terraforms: Vec<TerraformBlock>,
    pub providers: Vec<Provider>,
    pub modules: Vec<ModuleRef>,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_terraform(mut self, block: TerraformBlock) -> Self {
        self.terraforms.push(block);
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_module_ref(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.modules.push(ModuleRef {
            name: name.into(),
            source: source.into(),
        });
        self
    }
}

/// A directory holding at least one configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub path: ModulePath,
    pub files: Vec<File>,
    pub is_root: bool,
}

impl Module {
    pub fn new(path: impl Into<ModulePath>, files: Vec<File>) -> Self {
        Self {
            path: path.into(),
            files,
            is_root: false,
        }
    }

    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Backends of the given kind declared anywhere in the module; the last
    /// declaration wins when there are several.
    pub fn backend(&self, kind: &str) -> Option<&Backend> {
        self.files
            .iter()
            .flat_map(|f| f.terraforms.iter())
            .filter_map(|t| t.backend.as_ref())
            .filter(|b| b.kind == kind)
            .last()
    }

    /// Provider block with the given name; the last declaration wins.
    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.files
            .iter()
            .flat_map(|f| f.providers.iter())
            .filter(|p| p.name == name)
            .last()
    }

    /// Project of the first `google` provider block.
    pub fn google_project(&self) -> Option<&str> {
        self.files
            .iter()
            .flat_map(|f| f.providers.iter())
            .find(|p| p.name == "google")
            .and_then(|p| p.project.as_deref())
    }

    /// Every module reference of every file, in file order.
    pub fn module_refs(&self) -> impl Iterator<Item = &ModuleRef> {
        self.files.iter().flat_map(|f| f.modules.iter())
    }
}

impl From<PathBuf> for ModulePath {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}
