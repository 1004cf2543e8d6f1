//! File-backed branch pointers.

use std::fs;
use std::path::{Path, PathBuf};

use strata_types::Digest;
use tracing::{debug, info};

use crate::error::{RefError, RefResult};
use crate::names::validate_branch_name;

/// Name of the HEAD indirection file.
pub const HEAD_FILE: &str = "HEAD";
/// Directory holding one pointer file per branch.
pub const BRANCHES_DIR: &str = "branches";

/// Branch pointer storage rooted at a repository's metadata dir.
///
/// Layout: `<dir>/branches/<name>` holds the branch tip digest in hex (an
/// empty file is an unborn branch); `<dir>/HEAD` holds the active branch
/// name. These files are the only mutable persisted state in a repository.
#[derive(Clone, Debug)]
pub struct BranchStore {
    dir: PathBuf,
}

impl BranchStore {
    /// Open a branch store rooted at the repository metadata dir.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the `branches/` directory, an unborn default branch, and HEAD
    /// pointing at it.
    pub fn init(&self, default_branch: &str) -> RefResult<()> {
        validate_branch_name(default_branch)?;
        fs::create_dir_all(self.branches_dir())?;
        let path = self.branch_path(default_branch);
        if !path.exists() {
            fs::write(&path, b"")?;
        }
        self.set_head(default_branch)?;
        info!(branch = default_branch, "initialized branch store");
        Ok(())
    }

    fn branches_dir(&self) -> PathBuf {
        self.dir.join(BRANCHES_DIR)
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.branches_dir().join(name)
    }

    /// Returns `true` if a pointer file exists for `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.branch_path(name).is_file()
    }

    // ---------------------------------------------------------------
    // Branch pointers
    // ---------------------------------------------------------------

    /// Create a branch pointing at `at_commit`.
    ///
    /// Fails with [`RefError::BranchExists`] if `name` already has a
    /// pointer file.
    pub fn create(&self, name: &str, at_commit: Digest) -> RefResult<()> {
        validate_branch_name(name)?;
        if self.exists(name) {
            return Err(RefError::BranchExists {
                name: name.to_string(),
            });
        }
        fs::create_dir_all(self.branches_dir())?;
        self.write_pointer(name, at_commit)?;
        info!(branch = name, tip = %at_commit.short_hex(), "created branch");
        Ok(())
    }

    /// Read a branch tip. An unborn branch reads as the null digest.
    pub fn read(&self, name: &str) -> RefResult<Digest> {
        let content = match fs::read_to_string(self.branch_path(name)) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RefError::BranchNotFound {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Digest::null());
        }
        Digest::from_hex(trimmed).map_err(|e| RefError::MalformedPointer {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Move an existing branch pointer to `commit`.
    pub fn set(&self, name: &str, commit: Digest) -> RefResult<()> {
        if !self.exists(name) {
            return Err(RefError::BranchNotFound {
                name: name.to_string(),
            });
        }
        self.write_pointer(name, commit)?;
        debug!(branch = name, tip = %commit.short_hex(), "moved branch");
        Ok(())
    }

    fn write_pointer(&self, name: &str, commit: Digest) -> RefResult<()> {
        let content = if commit.is_null() {
            String::new()
        } else {
            commit.to_hex()
        };
        fs::write(self.branch_path(name), content)?;
        Ok(())
    }

    /// Delete a branch.
    ///
    /// Refuses to delete the currently checked-out branch. Without `force`,
    /// refuses to delete a branch that is not merged into HEAD's branch
    /// (`merged_into_head`, computed by the caller against the commit
    /// graph) — this protects unmerged work.
    pub fn delete(&self, name: &str, force: bool, merged_into_head: bool) -> RefResult<()> {
        if !self.exists(name) {
            return Err(RefError::BranchNotFound {
                name: name.to_string(),
            });
        }
        if self.head()? == name {
            return Err(RefError::DeleteCurrentBranch {
                name: name.to_string(),
            });
        }
        if !force && !merged_into_head {
            return Err(RefError::NotMerged {
                name: name.to_string(),
            });
        }
        fs::remove_file(self.branch_path(name))?;
        info!(branch = name, force, "deleted branch");
        Ok(())
    }

    /// Rename a branch atomically. If HEAD pointed at the old name, it is
    /// retargeted to the new one.
    pub fn rename(&self, old: &str, new: &str) -> RefResult<()> {
        validate_branch_name(new)?;
        if !self.exists(old) {
            return Err(RefError::BranchNotFound {
                name: old.to_string(),
            });
        }
        if self.exists(new) {
            return Err(RefError::BranchExists {
                name: new.to_string(),
            });
        }
        fs::rename(self.branch_path(old), self.branch_path(new))?;
        if self.head()? == old {
            self.set_head(new)?;
        }
        info!(from = old, to = new, "renamed branch");
        Ok(())
    }

    /// All branches with their tips, sorted by name.
    pub fn list(&self) -> RefResult<Vec<(String, Digest)>> {
        let mut branches = Vec::new();
        let entries = match fs::read_dir(self.branches_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(branches),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let tip = self.read(&name)?;
            branches.push((name, tip));
        }
        branches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(branches)
    }

    // ---------------------------------------------------------------
    // HEAD
    // ---------------------------------------------------------------

    /// The name of the currently checked-out branch.
    pub fn head(&self) -> RefResult<String> {
        let content =
            fs::read_to_string(self.dir.join(HEAD_FILE)).map_err(|_| RefError::MissingHead)?;
        let name = content.trim();
        if name.is_empty() {
            return Err(RefError::MissingHead);
        }
        Ok(name.to_string())
    }

    /// Point HEAD at `name`. Only this pointer changes; no commit is ever
    /// rewritten by a branch switch.
    pub fn set_head(&self, name: &str) -> RefResult<()> {
        validate_branch_name(name)?;
        fs::write(self.dir.join(HEAD_FILE), name)?;
        debug!(branch = name, "set HEAD");
        Ok(())
    }

    /// Tip of the branch HEAD points at.
    pub fn head_tip(&self) -> RefResult<Digest> {
        let branch = self.head()?;
        self.read(&branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, BranchStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = BranchStore::new(dir.path());
        store.init("main").unwrap();
        (dir, store)
    }

    fn digest(s: &str) -> Digest {
        Digest::from_bytes(s.as_bytes())
    }

    #[test]
    fn init_creates_unborn_main_and_head() {
        let (_dir, store) = store();
        assert_eq!(store.head().unwrap(), "main");
        assert!(store.read("main").unwrap().is_null());
        assert!(store.head_tip().unwrap().is_null());
    }

    #[test]
    fn create_and_read() {
        let (_dir, store) = store();
        store.create("feature", digest("c1")).unwrap();
        assert_eq!(store.read("feature").unwrap(), digest("c1"));
    }

    #[test]
    fn create_duplicate_fails() {
        let (_dir, store) = store();
        store.create("feature", digest("c1")).unwrap();
        let err = store.create("feature", digest("c2")).unwrap_err();
        assert!(matches!(err, RefError::BranchExists { .. }));
    }

    #[test]
    fn read_missing_fails() {
        let (_dir, store) = store();
        assert!(matches!(
            store.read("ghost"),
            Err(RefError::BranchNotFound { .. })
        ));
    }

    #[test]
    fn set_moves_pointer() {
        let (_dir, store) = store();
        store.set("main", digest("c1")).unwrap();
        assert_eq!(store.read("main").unwrap(), digest("c1"));
        store.set("main", digest("c2")).unwrap();
        assert_eq!(store.read("main").unwrap(), digest("c2"));
    }

    #[test]
    fn set_missing_fails() {
        let (_dir, store) = store();
        assert!(matches!(
            store.set("ghost", digest("c1")),
            Err(RefError::BranchNotFound { .. })
        ));
    }

    #[test]
    fn delete_protects_unmerged_work() {
        let (_dir, store) = store();
        store.create("feature", digest("c1")).unwrap();
        let err = store.delete("feature", false, false).unwrap_err();
        assert!(matches!(err, RefError::NotMerged { .. }));
        assert!(store.exists("feature"));

        // Merged or forced deletion both succeed.
        store.delete("feature", false, true).unwrap();
        store.create("other", digest("c2")).unwrap();
        store.delete("other", true, false).unwrap();
        assert!(!store.exists("other"));
    }

    #[test]
    fn cannot_delete_current_branch() {
        let (_dir, store) = store();
        let err = store.delete("main", true, true).unwrap_err();
        assert!(matches!(err, RefError::DeleteCurrentBranch { .. }));
    }

    #[test]
    fn rename_moves_pointer_and_head() {
        let (_dir, store) = store();
        store.set("main", digest("c1")).unwrap();
        store.rename("main", "trunk").unwrap();
        assert!(!store.exists("main"));
        assert_eq!(store.read("trunk").unwrap(), digest("c1"));
        assert_eq!(store.head().unwrap(), "trunk");
    }

    #[test]
    fn rename_errors() {
        let (_dir, store) = store();
        store.create("a", digest("c1")).unwrap();
        assert!(matches!(
            store.rename("ghost", "x"),
            Err(RefError::BranchNotFound { .. })
        ));
        assert!(matches!(
            store.rename("a", "main"),
            Err(RefError::BranchExists { .. })
        ));
    }

    #[test]
    fn list_is_sorted() {
        let (_dir, store) = store();
        store.create("zeta", digest("z")).unwrap();
        store.create("alpha", digest("a")).unwrap();
        let names: Vec<String> = store.list().unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "main", "zeta"]);
    }

    #[test]
    fn malformed_pointer_is_surfaced() {
        let (dir, store) = store();
        fs::write(dir.path().join("branches/bad"), "not-hex").unwrap();
        assert!(matches!(
            store.read("bad"),
            Err(RefError::MalformedPointer { .. })
        ));
    }

    #[test]
    fn switching_head_rewrites_only_head() {
        let (_dir, store) = store();
        store.create("feature", digest("c1")).unwrap();
        store.set_head("feature").unwrap();
        assert_eq!(store.head().unwrap(), "feature");
        assert_eq!(store.head_tip().unwrap(), digest("c1"));
        // main's pointer is untouched.
        assert!(store.read("main").unwrap().is_null());
    }
}
