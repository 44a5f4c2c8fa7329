use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::VaultConfig;

/// A note file found under the vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    pub path: PathBuf,
    /// `/`-separated path relative to the vault root.
    pub relative_path: String,
}

/// Result of a vault walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultScan {
    /// Matching notes, sorted by relative path.
    pub entries: Vec<VaultEntry>,
    /// Paths the walk could not enter, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Walk the vault and collect every note matching the include globs.
///
/// Only a missing root or a bad glob is fatal. An unreadable directory or a
/// symlink loop is logged and recorded in [`VaultScan::failed`].
pub fn scan_vault(vault: &VaultConfig) -> Result<VaultScan> {
    let root = &vault.root;
    if !root.is_dir() {
        bail!("Vault root does not exist: {}", root.display());
    }

    let include_set = build_globset(&vault.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/.obsidian/**".to_string(),
        "**/.trash/**".to_string(),
    ];
    default_excludes.extend(vault.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut entries = Vec::new();
    let mut failed = Vec::new();

    let walker = WalkDir::new(root).follow_links(vault.follow_symlinks);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable vault path");
                failed.push((path, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        entries.push(VaultEntry {
            path: path.to_path_buf(),
            relative_path: rel_str,
        });
    }

    // Sort for deterministic ordinals
    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(VaultScan { entries, failed })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("Week 2")).unwrap();
        fs::create_dir_all(root.join("Week 1")).unwrap();
        fs::create_dir_all(root.join(".obsidian")).unwrap();
        fs::write(root.join("Week 2/b.md"), "b").unwrap();
        fs::write(root.join("Week 1/a.md"), "a").unwrap();
        fs::write(root.join("Week 1/image.png"), "png").unwrap();
        fs::write(root.join(".obsidian/workspace.md"), "x").unwrap();

        let cfg = Config::for_vault(root);
        let entries = scan_vault(&cfg.vault).unwrap().entries;
        let rels: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["Week 1/a.md", "Week 2/b.md"]);
    }

    #[test]
    fn test_user_excludes_applied() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("Templates")).unwrap();
        fs::write(root.join("Templates/daily.md"), "t").unwrap();
        fs::write(root.join("note.md"), "n").unwrap();

        let mut cfg = Config::for_vault(root);
        cfg.vault.exclude_globs = vec!["Templates/**".to_string()];
        let entries = scan_vault(&cfg.vault).unwrap().entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relative_path, "note.md");
    }

    #[test]
    fn test_missing_root_fails() {
        let cfg = Config::for_vault("/definitely/not/a/vault");
        assert!(scan_vault(&cfg.vault).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_recorded_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("note.md"), "n").unwrap();
        fs::write(root.join("sub/deep.md"), "d").unwrap();
        std::os::unix::fs::symlink(root, root.join("sub/loop")).unwrap();

        let mut cfg = Config::for_vault(root);
        cfg.vault.follow_symlinks = true;
        let scan = scan_vault(&cfg.vault).unwrap();

        let rels: Vec<&str> = scan.entries.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["note.md", "sub/deep.md"]);
        assert_eq!(scan.failed.len(), 1);
        assert!(scan.failed[0].0.ends_with("sub/loop"));
    }
}
