//! Directory-level configuration parser.
//!
//! Decodes the `.tf` files of a single directory into a [`Module`]. Only the
//! blocks listed in [`crate::model`] are extracted; everything else in the
//! body is skipped.

use std::fs;
use std::path::Path;

use hcl::{Block, Body, Expression};
use tracing::{debug, warn};

use crate::error::{IacError, IacResult};
use crate::model::{
    Backend, File, Module, ModulePath, ModuleRef, Provider, TerraformBlock, CONFIG_EXTENSION,
    LOCK_FILE_NAME,
};
use crate::path;

/// Parse every configuration file directly inside `dir`.
///
/// Returns `Ok(None)` when the directory holds no `.tf` file. A file whose
/// HCL cannot be decoded is kept as an empty [`File`]; I/O failures abort.
pub fn parse_dir(dir: impl AsRef<Path>) -> IacResult<Option<Module>> {
    let dir = dir.as_ref();
    let abs = path::absolute(dir)?;

    let mut entries = fs::read_dir(&abs)
        .map_err(|e| IacError::io(&abs, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| IacError::io(&abs, e))?;
    entries.sort_by_key(|e| e.file_name());

    let mut is_root = false;
    let mut files = Vec::new();

    for entry in entries {
        let entry_path = entry.path();
        let file_type = entry.file_type().map_err(|e| IacError::io(&entry_path, e))?;
        if file_type.is_dir() {
            continue;
        }

        if entry.file_name() == LOCK_FILE_NAME {
            is_root = true;
            continue;
        }

        if entry_path.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
            continue;
        }

        let content =
            fs::read_to_string(&entry_path).map_err(|e| IacError::io(&entry_path, e))?;
        files.push(parse_file(&entry_path, &content));
    }

    if files.is_empty() {
        return Ok(None);
    }

    debug!(dir = %abs.display(), files = files.len(), is_root, "Parsed module");

    Ok(Some(Module {
        path: ModulePath::new(abs),
        files,
        is_root,
    }))
}

/// Decode one file's content. Syntax errors are logged and yield an empty
/// file.
pub fn parse_file(file_path: &Path, content: &str) -> File {
    let mut file = File::new(file_path);

    let body = match hcl::parse(content) {
        Ok(body) => body,
        Err(err) => {
            warn!(file = %file_path.display(), error = %err, "Ignoring unparsable configuration file");
            return file;
        }
    };

    for block in body.blocks() {
        match block.identifier() {
            "terraform" => file.terraforms.push(decode_terraform(block.body())),
            "provider" => {
                if let Some(name) = first_label(block) {
                    file.providers.push(Provider {
                        name: name.to_string(),
                        project: string_attr(block.body(), "project"),
                    });
                }
            }
            "module" => {
                let source = string_attr(block.body(), "source");
                if let (Some(name), Some(source)) = (first_label(block), source) {
                    file.modules.push(ModuleRef {
                        name: name.to_string(),
                        source,
                    });
                }
            }
            _ => {}
        }
    }

    file
}

fn decode_terraform(body: &Body) -> TerraformBlock {
    let backend = body
        .blocks()
        .filter(|b| b.identifier() == "backend")
        .filter_map(|b| {
            first_label(b).map(|kind| Backend {
                kind: kind.to_string(),
                bucket: string_attr(b.body(), "bucket"),
                prefix: string_attr(b.body(), "prefix"),
            })
        })
        .last();

    TerraformBlock { backend }
}

fn first_label(block: &Block) -> Option<&str> {
    block.labels().first().map(|l| l.as_str())
}

fn string_attr(body: &Body, key: &str) -> Option<String> {
    body.attributes()
        .filter(|a| a.key() == key)
        .filter_map(|a| match a.expr() {
            Expression::String(s) => Some(s.clone()),
            _ => None,
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_file_extracts_known_blocks() {
        let content = r#"
terraform {
  required_version = ">= 1.5"
  backend "gcs" {
    bucket = "prj01-terraform"
    prefix = "roots/r1"
  }
}

provider "google" {
  project = "prj01"
  region  = "asia-northeast1"
}

module "network" {
  source = "../../commons/network"
}

resource "google_storage_bucket" "b" {
  name = "x"
}
"#;
        let file = parse_file(Path::new("/roots/r1/main.tf"), content);

        assert_eq!(file.path, PathBuf::from("/roots/r1/main.tf"));
        assert_eq!(
            file.terraforms,
            vec![TerraformBlock {
                backend: Some(Backend {
                    kind: "gcs".to_string(),
                    bucket: Some("prj01-terraform".to_string()),
                    prefix: Some("roots/r1".to_string()),
                }),
            }]
        );
        assert_eq!(
            file.providers,
            vec![Provider {
                name: "google".to_string(),
                project: Some("prj01".to_string()),
            }]
        );
        assert_eq!(file.modules.len(), 1);
        assert_eq!(file.modules[0].name, "network");
        assert_eq!(file.modules[0].source, "../../commons/network");
    }

    #[test]
    fn test_parse_file_terraform_without_backend() {
        let file = parse_file(
            Path::new("versions.tf"),
            "terraform {\n  required_version = \">= 1.5\"\n}\n",
        );
        assert_eq!(file.terraforms, vec![TerraformBlock { backend: None }]);
    }

    #[test]
    fn test_parse_file_non_string_values_are_absent() {
        let file = parse_file(
            Path::new("main.tf"),
            "provider \"google\" {\n  project = var.project\n}\n",
        );
        assert_eq!(file.providers[0].project, None);
    }

    #[test]
    fn test_parse_file_tolerates_syntax_errors() {
        let file = parse_file(Path::new("broken.tf"), "terraform {\n  backend \"gcs\" {\n");
        assert_eq!(file, File::new("broken.tf"));
    }

    #[test]
    fn test_parse_dir_root_marker_and_ordering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.tf"), "provider \"google\" {}\n").unwrap();
        fs::write(dir.path().join("a.tf"), "terraform {}\n").unwrap();
        fs::write(dir.path().join("README.md"), "# docs\n").unwrap();
        fs::write(dir.path().join(LOCK_FILE_NAME), "# lock\n").unwrap();

        let module = parse_dir(dir.path()).unwrap().unwrap();

        assert!(module.is_root);
        let names: Vec<_> = module
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tf", "b.tf"]);
    }

    #[test]
    fn test_parse_dir_without_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "nothing").unwrap();
        fs::write(dir.path().join(LOCK_FILE_NAME), "# lock\n").unwrap();

        assert!(parse_dir(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_parse_dir_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_dir(dir.path().join("missing"));
        assert!(matches!(result, Err(IacError::Io { .. })));
    }
}
