//! # tfgate_iac
//!
//! Terraform module model and provisioning gateway for tfgate.
//!
//! This crate parses a tree of Terraform configuration directories into
//! [`Module`]s, derives which modules reference which, resolves the root
//! modules affected by a set of changed files, and drives `terraform init`,
//! `plan` and `apply` against them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use tfgate_iac::{ModuleGraph, TerraformRunner};
//! use tfgate_runner::ProcessRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = ModuleGraph::from_base_dir("infra")?;
//! let changed = vec![PathBuf::from("/repo/infra/commons/network/main.tf")];
//!
//! let terraform = TerraformRunner::new(Arc::new(ProcessRunner::new()));
//! for module in graph.impacted_roots(&changed) {
//!     terraform.init(module).await?;
//!     let plan = terraform.plan(module).await?;
//!     println!("{}: diff={}", module.path, plan.has_diff);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod impact;
pub mod model;
pub mod parser;
pub mod path;
pub mod terraform;

pub use error::{IacError, IacResult};
pub use graph::{build_parent_index, parse_base_dir, ModuleGraph, ParentIndex};
pub use model::{
    Backend, File, Module, ModulePath, ModuleRef, Provider, TerraformBlock, CONFIG_EXTENSION,
    LOCK_FILE_NAME,
};
pub use parser::parse_dir;
pub use terraform::{ApplyResult, InitResult, PlanResult, Subcommand, TerraformRunner};
