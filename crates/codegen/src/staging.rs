//! Staged, all-or-nothing file writes
//!
//! A [`Transaction`] collects writes and removals below a root directory.
//! Content is written to a hidden staging directory inside the root first,
//! so nothing visible changes until [`Transaction::commit`]. Commit moves
//! replaced and removed paths aside, renames staged files into place and
//! records every directory it creates. If any step fails, everything done
//! so far is undone in reverse order and the original error is returned.
//!
//! The staging directory lives inside the root so every move is a rename on
//! one filesystem. It is deleted when the transaction is dropped.

use blueprint_core::{EngineError, EngineResult};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Prefix of the staging directory created inside the root
pub const STAGING_PREFIX: &str = ".blueprint-staging-";

#[derive(Debug)]
enum Operation {
    Write { staged: PathBuf },
    Remove,
}

#[derive(Debug)]
struct Entry {
    /// Path relative to the root
    rel: PathBuf,
    op: Operation,
}

/// What a commit changed, relative to the root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub created: Vec<PathBuf>,
    pub replaced: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl CommitReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.replaced.len() + self.removed.len()
    }
}

/// Undo log of a commit in progress
#[derive(Debug, Default)]
struct Journal {
    /// Files moved into place
    written: Vec<PathBuf>,
    /// (original path, backup path) of replaced or removed paths
    backups: Vec<(PathBuf, PathBuf)>,
    /// Directories created, outermost first
    created_dirs: Vec<PathBuf>,
}

impl Journal {
    fn rollback(self) {
        for path in self.written.iter().rev() {
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "Rollback could not remove file");
            }
        }
        for (original, backup) in self.backups.iter().rev() {
            if let Err(e) = fs::rename(backup, original) {
                warn!(path = %original.display(), error = %e, "Rollback could not restore path");
            }
        }
        for dir in self.created_dirs.iter().rev() {
            // only empty directories; anything else was not ours
            let _ = fs::remove_dir(dir);
        }
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// A set of staged file operations committed as a whole
#[derive(Debug)]
pub struct Transaction {
    root: PathBuf,
    staging: TempDir,
    entries: Vec<Entry>,
    next_id: usize,
}

impl Transaction {
    /// Start a transaction below `root`, creating it if needed
    pub fn begin(root: &Path) -> EngineResult<Self> {
        fs::create_dir_all(root).map_err(|e| EngineError::DirectoryCreate {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(root)
            .map_err(|e| EngineError::DirectoryCreate {
                path: root.join(STAGING_PREFIX),
                message: e.to_string(),
            })?;
        debug!(root = %root.display(), staging = %staging.path().display(), "Transaction started");
        Ok(Self {
            root: root.to_path_buf(),
            staging,
            entries: Vec::new(),
            next_id: 0,
        })
    }

    /// Root directory of the transaction
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths with a staged operation, relative to the root
    pub fn staged_paths(&self) -> Vec<&Path> {
        self.entries.iter().map(|e| e.rel.as_path()).collect()
    }

    /// Stage a file write
    ///
    /// Fails with `OutputExists` when the target exists and `allow_replace`
    /// is false. Staging the same path twice keeps the last content.
    pub fn stage(
        &mut self,
        rel: impl AsRef<Path>,
        content: &str,
        allow_replace: bool,
    ) -> EngineResult<()> {
        let rel = rel.as_ref().to_path_buf();
        let target = self.root.join(&rel);
        if target.exists() && !allow_replace {
            return Err(EngineError::OutputExists(target));
        }

        let staged = self.staging.path().join(format!("{:05}.staged", self.next_id));
        self.next_id += 1;
        fs::write(&staged, content).map_err(|e| EngineError::FileWrite {
            path: staged.clone(),
            message: e.to_string(),
        })?;

        self.entries.retain(|e| e.rel != rel);
        self.entries.push(Entry {
            rel,
            op: Operation::Write { staged },
        });
        Ok(())
    }

    /// Stage the removal of a file or directory tree
    pub fn remove(&mut self, rel: impl AsRef<Path>) -> EngineResult<()> {
        let rel = rel.as_ref().to_path_buf();
        let target = self.root.join(&rel);
        if !target.exists() {
            return Err(EngineError::FileRead {
                path: target,
                message: "path to remove does not exist".to_string(),
            });
        }
        self.entries.retain(|e| e.rel != rel);
        self.entries.push(Entry {
            rel,
            op: Operation::Remove,
        });
        Ok(())
    }

    /// Apply every staged operation, or none of them
    pub fn commit(self) -> EngineResult<CommitReport> {
        let mut journal = Journal::default();
        let mut report = CommitReport::default();

        for (index, entry) in self.entries.iter().enumerate() {
            if let Err(e) = self.apply(index, entry, &mut journal, &mut report) {
                warn!(path = %entry.rel.display(), error = %e, "Commit failed, rolling back");
                journal.rollback();
                return Err(e);
            }
        }

        debug!(
            created = report.created.len(),
            replaced = report.replaced.len(),
            removed = report.removed.len(),
            "Transaction committed"
        );
        Ok(report)
    }

    fn apply(
        &self,
        index: usize,
        entry: &Entry,
        journal: &mut Journal,
        report: &mut CommitReport,
    ) -> EngineResult<()> {
        let target = self.root.join(&entry.rel);

        match &entry.op {
            Operation::Remove => {
                let backup = self.backup_path(index);
                move_path(&target, &backup)?;
                journal.backups.push((target, backup));
                report.removed.push(entry.rel.clone());
            }
            Operation::Write { staged } => {
                if let Some(parent) = target.parent() {
                    create_dirs(parent, journal)?;
                }
                let replaced = target.exists();
                if replaced {
                    let backup = self.backup_path(index);
                    move_path(&target, &backup)?;
                    journal.backups.push((target.clone(), backup));
                }
                move_path(staged, &target)?;
                journal.written.push(target);
                debug!(path = %entry.rel.display(), replaced, "Wrote file");
                if replaced {
                    report.replaced.push(entry.rel.clone());
                } else {
                    report.created.push(entry.rel.clone());
                }
            }
        }
        Ok(())
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.staging.path().join(format!("{:05}.backup", index))
    }
}

/// Create `dir` and its missing ancestors, recording each one created
fn create_dirs(dir: &Path, journal: &mut Journal) -> EngineResult<()> {
    let missing: Vec<&Path> = dir.ancestors().take_while(|d| !d.exists()).collect();
    for d in missing.into_iter().rev() {
        fs::create_dir(d).map_err(|e| EngineError::DirectoryCreate {
            path: d.to_path_buf(),
            message: e.to_string(),
        })?;
        journal.created_dirs.push(d.to_path_buf());
    }
    if !dir.is_dir() {
        return Err(EngineError::DirectoryCreate {
            path: dir.to_path_buf(),
            message: "a file is in the way".to_string(),
        });
    }
    Ok(())
}

fn move_path(from: &Path, to: &Path) -> EngineResult<()> {
    fs::rename(from, to).map_err(|e| EngineError::FileWrite {
        path: to.to_path_buf(),
        message: format!("cannot move '{}': {}", from.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn leftover_staging(root: &Path) -> bool {
        fs::read_dir(root).unwrap().filter_map(Result::ok).any(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with(STAGING_PREFIX)
        })
    }

    #[test]
    fn test_nothing_visible_before_commit() {
        let dir = tempdir().unwrap();
        let mut tx = Transaction::begin(dir.path()).unwrap();
        tx.stage("Modules/Inventory/app/Models/Warehouse.php", "<?php", false)
            .unwrap();
        assert!(!dir.path().join("Modules").exists());

        let report = tx.commit().unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("Modules/Inventory/app/Models/Warehouse.php"))
                .unwrap(),
            "<?php"
        );
        assert!(!leftover_staging(dir.path()));
    }

    #[test]
    fn test_existing_file_needs_replace() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("composer.json"), "{}").unwrap();

        let mut tx = Transaction::begin(dir.path()).unwrap();
        let err = tx.stage("composer.json", "{\"a\":1}", false).unwrap_err();
        assert!(matches!(err, EngineError::OutputExists(_)));

        tx.stage("composer.json", "{\"a\":1}", true).unwrap();
        let report = tx.commit().unwrap();
        assert_eq!(report.replaced, vec![PathBuf::from("composer.json")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("composer.json")).unwrap(),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_restaging_keeps_last_content() {
        let dir = tempdir().unwrap();
        let mut tx = Transaction::begin(dir.path()).unwrap();
        tx.stage("a.txt", "one", false).unwrap();
        tx.stage("a.txt", "two", false).unwrap();
        assert_eq!(tx.len(), 1);
        tx.commit().unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "two");
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("routes.php"), "original").unwrap();
        fs::write(dir.path().join("blocker"), "file, not a directory").unwrap();

        let mut tx = Transaction::begin(dir.path()).unwrap();
        tx.stage("routes.php", "edited", true).unwrap();
        tx.stage("Modules/Inventory/a.txt", "new", false).unwrap();
        tx.stage("blocker/b.txt", "cannot land", false).unwrap();

        assert!(tx.commit().is_err());

        assert_eq!(
            fs::read_to_string(dir.path().join("routes.php")).unwrap(),
            "original"
        );
        assert!(!dir.path().join("Modules").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("blocker")).unwrap(),
            "file, not a directory"
        );
        assert!(!leftover_staging(dir.path()));
    }

    #[test]
    fn test_remove_and_rollback_restores_tree() {
        let dir = tempdir().unwrap();
        let module = dir.path().join("Modules/Inventory");
        fs::create_dir_all(module.join("app")).unwrap();
        fs::write(module.join("app/x.php"), "<?php").unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();

        let mut tx = Transaction::begin(dir.path()).unwrap();
        tx.remove("Modules/Inventory").unwrap();
        tx.stage("blocker/c.txt", "x", false).unwrap();
        assert!(tx.commit().is_err());
        assert!(module.join("app/x.php").exists());

        let mut tx = Transaction::begin(dir.path()).unwrap();
        tx.remove("Modules/Inventory").unwrap();
        let report = tx.commit().unwrap();
        assert_eq!(report.removed, vec![PathBuf::from("Modules/Inventory")]);
        assert!(!module.exists());
    }

    #[test]
    fn test_remove_missing_path_fails() {
        let dir = tempdir().unwrap();
        let mut tx = Transaction::begin(dir.path()).unwrap();
        assert!(tx.remove("Modules/Nope").is_err());
    }
}
