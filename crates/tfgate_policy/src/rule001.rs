//! `rule001`: every root module keeps its state in a GCS backend named after
//! its Google project, under a prefix equal to its path in the tree.

use std::path::Path;

use tracing::debug;

use tfgate_iac::{path, Module};

use crate::error::PolicyResult;
use crate::rules::{Rule, RuleViolation};

const RULE_ID: &str = "rule001";

pub const MSG_BACKEND_NOT_FOUND: &str = r#"resource terraform.backend."gcs" not found"#;
pub const MSG_INVALID_BUCKET: &str = r#"invalid terraform.backend."gcs".bucket"#;
pub const MSG_INVALID_PREFIX: &str = r#"invalid terraform.backend."gcs".prefix"#;
pub const MSG_PROVIDER_NOT_FOUND: &str = r#"resource provider."google" not found"#;

/// GCS backend layout check for root modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rule001;

impl Rule001 {
    fn check_module(&self, base_dir: &Path, module: &Module) -> PolicyResult<Vec<RuleViolation>> {
        let mut violations = Vec::new();

        let backend = module.backend("gcs");
        let provider = module.provider("google");
        let rel = path::relative_to(module.path.as_path(), base_dir)?;

        match (backend, provider) {
            (None, _) => {
                violations.push(RuleViolation::missing(RULE_ID, &module.path, MSG_BACKEND_NOT_FOUND));
            }
            (Some(backend), Some(provider)) => {
                let expected_bucket =
                    format!("{}-terraform", provider.project.as_deref().unwrap_or_default());
                let bucket = backend.bucket.as_deref().unwrap_or_default();
                if bucket != expected_bucket {
                    violations.push(RuleViolation::new(
                        RULE_ID,
                        &module.path,
                        MSG_INVALID_BUCKET,
                        expected_bucket,
                        bucket,
                    ));
                }

                let expected_prefix = rel.to_string_lossy();
                let prefix = backend.prefix.as_deref().unwrap_or_default();
                if prefix != expected_prefix {
                    violations.push(RuleViolation::new(
                        RULE_ID,
                        &module.path,
                        MSG_INVALID_PREFIX,
                        expected_prefix,
                        prefix,
                    ));
                }
            }
            (Some(_), None) => {}
        }

        if provider.is_none() {
            violations.push(RuleViolation::missing(RULE_ID, &module.path, MSG_PROVIDER_NOT_FOUND));
        }

        Ok(violations)
    }
}

impl Rule for Rule001 {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn name(&self) -> &str {
        "GCS backend matches Google project and module path"
    }

    fn check(&self, base_dir: &Path, modules: &[Module]) -> PolicyResult<Vec<RuleViolation>> {
        let mut violations = Vec::new();
        for module in modules.iter().filter(|m| m.is_root) {
            let found = self.check_module(base_dir, module)?;
            debug!(module = %module.path, violations = found.len(), "rule001 checked");
            violations.extend(found);
        }
        Ok(violations)
    }
}
