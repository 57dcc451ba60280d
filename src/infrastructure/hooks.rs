//! Project wiring written by `init`: the git pre-commit hook and the
//! `package.json` scripts that invoke the deploy command.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEPLOY_COMMAND: &str = "perma-deploy deploy";
pub const DRY_RUN_COMMAND: &str = "perma-deploy deploy --dry-run";

fn hook_script() -> String {
    format!("#!/bin/sh\n{}\n", DEPLOY_COMMAND)
}

/// Install a pre-commit hook that runs the deploy command
pub fn install_pre_commit(hooks_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(hooks_dir)
        .with_context(|| format!("Failed to create {}", hooks_dir.display()))?;
    let path = hooks_dir.join("pre-commit");
    std::fs::write(&path, hook_script())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    make_executable(&path)?;
    Ok(path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to make {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Add `deploy` and `deploy:dry-run` scripts to `package.json`.
///
/// Existing scripts with those names are left untouched. Returns the names
/// of the scripts that were added.
pub fn add_package_scripts(package_json: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(package_json)
        .with_context(|| format!("Failed to read {}", package_json.display()))?;
    let mut package: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", package_json.display()))?;

    let root = package
        .as_object_mut()
        .context("package.json is not a JSON object")?;
    let scripts = root
        .entry("scripts")
        .or_insert_with(|| serde_json::Value::Object(Default::default()))
        .as_object_mut()
        .context("package.json `scripts` is not an object")?;

    let mut added = Vec::new();
    for (name, command) in [("deploy", DEPLOY_COMMAND), ("deploy:dry-run", DRY_RUN_COMMAND)] {
        if !scripts.contains_key(name) {
            scripts.insert(name.to_string(), serde_json::Value::String(command.to_string()));
            added.push(name.to_string());
        }
    }

    if !added.is_empty() {
        let mut updated =
            serde_json::to_string_pretty(&package).context("Failed to serialize package.json")?;
        updated.push('\n');
        std::fs::write(package_json, updated)
            .with_context(|| format!("Failed to write {}", package_json.display()))?;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pre_commit_hook_runs_deploy() {
        let dir = TempDir::new().unwrap();
        let path = install_pre_commit(&dir.path().join(".git/hooks")).unwrap();
        let script = std::fs::read_to_string(&path).unwrap();
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("perma-deploy deploy"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_scripts_added_once_and_order_preserved() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("package.json");
        std::fs::write(
            &package,
            r#"{"name":"site","version":"1.0.0","scripts":{"build":"vite build","deploy":"custom"}}"#,
        )
        .unwrap();

        let added = add_package_scripts(&package).unwrap();
        assert_eq!(added, vec!["deploy:dry-run".to_string()]);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&package).unwrap()).unwrap();
        assert_eq!(value["scripts"]["deploy"], "custom");
        assert_eq!(value["scripts"]["deploy:dry-run"], DRY_RUN_COMMAND);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "version", "scripts"]);

        assert!(add_package_scripts(&package).unwrap().is_empty());
    }

    #[test]
    fn test_scripts_section_created_when_missing() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("package.json");
        std::fs::write(&package, r#"{"name":"site"}"#).unwrap();
        let added = add_package_scripts(&package).unwrap();
        assert_eq!(added.len(), 2);
    }
}
