//! Integration tests checking on-disk module trees against the standard rules.

use std::fs;
use std::path::Path;

use tempfile::tempdir;
use tfgate_iac::LOCK_FILE_NAME;
use tfgate_policy::{CollectingReporter, PolicyError, RuleEngine, RuleSet};

fn root_module(base: &Path, rel: &str, content: &str) {
    let dir = base.join(rel);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("main.tf"), content).unwrap();
    fs::write(dir.join(LOCK_FILE_NAME), "# lock\n").unwrap();
}

fn compliant(project: &str, prefix: &str) -> String {
    format!(
        r#"
terraform {{
  backend "gcs" {{
    bucket = "{project}-terraform"
    prefix = "{prefix}"
  }}
}}

provider "google" {{
  project = "{project}"
}}
"#
    )
}

#[test]
fn test_violations_reported_in_tree_order() {
    let dir = tempdir().unwrap();
    let base = dir.path();

    root_module(base, "mods/ng001", "provider \"google\" {\n  project = \"base-999\"\n}\n");
    root_module(
        base,
        "mods/ng002",
        "terraform {\n  backend \"gcs\" {\n    bucket = \"x-terraform\"\n    prefix = \"mods/ng002\"\n  }\n}\n",
    );
    root_module(
        base,
        "mods/ng003",
        &compliant("base-999", "mods/ng003").replace("base-999-terraform", "hoge-terraform"),
    );
    root_module(
        base,
        "mods/ng004",
        &compliant("base-999", "hoge"),
    );
    root_module(base, "mods/ok001", &compliant("base-999", "mods/ok001"));

    let rules = RuleSet::standard();
    let mut reporter = CollectingReporter::new();
    let outcome = RuleEngine::new(&rules)
        .check_base_dir(base, &mut reporter)
        .unwrap();

    assert!(!outcome.passed);
    let b = base.display();
    assert_eq!(
        reporter.rendered(),
        format!(
            "resource terraform.backend.\"gcs\" not found ({b}/mods/ng001)\n  expected: true\n  actual: false\n\
             resource provider.\"google\" not found ({b}/mods/ng002)\n  expected: true\n  actual: false\n\
             invalid terraform.backend.\"gcs\".bucket ({b}/mods/ng003)\n  expected: base-999-terraform\n  actual: hoge-terraform\n\
             invalid terraform.backend.\"gcs\".prefix ({b}/mods/ng004)\n  expected: mods/ng004\n  actual: hoge\n"
        )
    );
}

#[test]
fn test_compliant_tree_passes() {
    let dir = tempdir().unwrap();
    root_module(dir.path(), "roots/app", &compliant("prj01", "roots/app"));
    let shared = dir.path().join("commons/shared");
    fs::create_dir_all(&shared).unwrap();
    fs::write(shared.join("main.tf"), "variable \"name\" {}\n").unwrap();

    let rules = RuleSet::standard();
    let mut reporter = CollectingReporter::new();
    let outcome = RuleEngine::new(&rules)
        .check_base_dir(dir.path(), &mut reporter)
        .unwrap();

    assert!(outcome.passed);
    assert!(reporter.violations.is_empty());
    assert_eq!(outcome.modules_checked, 2);
}

#[test]
fn test_broken_hcl_is_ignored() {
    let dir = tempdir().unwrap();
    root_module(dir.path(), "roots/app", &compliant("prj01", "roots/app"));
    fs::write(dir.path().join("roots/app/broken.tf"), "resource \"x\" {\n").unwrap();

    let rules = RuleSet::standard();
    let outcome = RuleEngine::new(&rules)
        .check_base_dir(dir.path(), &mut CollectingReporter::new())
        .unwrap();

    assert!(outcome.passed);
}

#[test]
fn test_missing_base_dir() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("caseXXX");

    let rules = RuleSet::standard();
    let err = RuleEngine::new(&rules)
        .check_base_dir(&missing, &mut CollectingReporter::new())
        .unwrap_err();

    assert!(matches!(err, PolicyError::Iac(_)));
    assert_eq!(err.to_string(), format!("{} does not exist", missing.display()));
}
