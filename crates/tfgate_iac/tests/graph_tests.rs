//! Integration tests for parsing a module tree from disk and resolving impact.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use tfgate_iac::{parse_base_dir, IacError, ModuleGraph, ModulePath, LOCK_FILE_NAME};

fn write(base: &Path, rel: &str, content: &str) {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn root_module(base: &Path, rel: &str, body: &str) {
    write(base, &format!("{rel}/main.tf"), body);
    write(base, &format!("{rel}/{LOCK_FILE_NAME}"), "# lock\n");
}

/// roots/r1 -> commons/r1m1 -> commons/shared
/// roots/r2 -> commons/r2m1 -> commons/shared
/// commons/unused is referenced by nobody.
fn fixture(base: &Path) {
    root_module(
        base,
        "roots/r1",
        r#"module "m1" { source = "../../commons/r1m1" }"#,
    );
    root_module(
        base,
        "roots/r2",
        r#"module "m1" { source = "../../commons/r2m1" }"#,
    );
    write(
        base,
        "commons/r1m1/main.tf",
        r#"module "shared" { source = "../shared" }"#,
    );
    write(
        base,
        "commons/r2m1/main.tf",
        r#"module "shared" { source = "../shared" }"#,
    );
    write(base, "commons/shared/main.tf", "variable \"name\" {}\n");
    write(base, "commons/unused/main.tf", "variable \"name\" {}\n");
    write(base, "README.md", "# infra\n");
}

fn abs(base: &Path, rel: &str) -> PathBuf {
    base.join(rel)
}

fn paths(graph: &ModuleGraph, changed: &[PathBuf]) -> Vec<ModulePath> {
    graph
        .impacted_roots(changed)
        .into_iter()
        .map(|m| m.path.clone())
        .collect()
}

#[test]
fn test_parse_base_dir_walk_order() {
    let dir = tempdir().unwrap();
    fixture(dir.path());

    let modules = parse_base_dir(dir.path()).unwrap();
    let rels: Vec<String> = modules
        .iter()
        .map(|m| {
            m.path
                .as_path()
                .strip_prefix(dir.path())
                .unwrap()
                .display()
                .to_string()
        })
        .collect();

    assert_eq!(
        rels,
        vec![
            "commons/r1m1",
            "commons/r2m1",
            "commons/shared",
            "commons/unused",
            "roots/r1",
            "roots/r2",
        ]
    );
    assert!(modules.iter().filter(|m| m.is_root).count() == 2);
}

#[test]
fn test_shared_module_change_hits_both_roots() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let graph = ModuleGraph::from_base_dir(dir.path()).unwrap();

    let impacted = paths(&graph, &[abs(dir.path(), "commons/shared/main.tf")]);

    assert_eq!(
        impacted,
        vec![
            ModulePath::new(abs(dir.path(), "roots/r1")),
            ModulePath::new(abs(dir.path(), "roots/r2")),
        ]
    );
}

#[test]
fn test_branch_change_hits_one_root() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let graph = ModuleGraph::from_base_dir(dir.path()).unwrap();

    let impacted = paths(&graph, &[abs(dir.path(), "commons/r2m1/main.tf")]);

    assert_eq!(impacted, vec![ModulePath::new(abs(dir.path(), "roots/r2"))]);
}

#[test]
fn test_unrelated_changes_hit_nothing() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let graph = ModuleGraph::from_base_dir(dir.path()).unwrap();

    let impacted = paths(
        &graph,
        &[
            abs(dir.path(), "README.md"),
            abs(dir.path(), "commons/unused/main.tf"),
            PathBuf::from("/elsewhere/main.tf"),
        ],
    );

    assert!(impacted.is_empty());
}

#[test]
fn test_broken_hcl_is_tolerated() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    write(dir.path(), "roots/r1/broken.tf", "terraform {\n  backend \"gcs\" {\n");

    let graph = ModuleGraph::from_base_dir(dir.path()).unwrap();
    let r1 = graph
        .get(&ModulePath::new(abs(dir.path(), "roots/r1")))
        .unwrap();

    assert_eq!(r1.files.len(), 2);
    assert!(r1.files[0].terraforms.is_empty());
    assert_eq!(
        paths(&graph, &[abs(dir.path(), "commons/r1m1/main.tf")]),
        vec![ModulePath::new(abs(dir.path(), "roots/r1"))]
    );
}

#[test]
fn test_missing_base_dir() {
    let dir = tempdir().unwrap();
    let result = ModuleGraph::from_base_dir(dir.path().join("caseXXX"));
    assert!(matches!(result, Err(IacError::BaseDirNotFound(_))));
}
