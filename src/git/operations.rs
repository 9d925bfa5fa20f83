use super::{GitRepo, path_from_bytes};
use anyhow::{Context, Result};
use git2::{Delta, DiffOptions, Status, StatusOptions};
use tracing::debug;

impl GitRepo {
    /// Files staged for commit. Staged deletions are left out since there
    /// is nothing left on disk for a hook to look at.
    pub fn staged_files(&self) -> Result<Vec<String>> {
        let mut status_opts = StatusOptions::new();
        status_opts.include_ignored(false);
        status_opts.include_untracked(false);

        let statuses = self
            .repo
            .statuses(Some(&mut status_opts))
            .context("Failed to get repository status")?;

        let mut files = Vec::new();
        for entry in statuses.iter() {
            let status = entry.status();
            if status.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ) {
                if let Some(path) = entry.path() {
                    files.push(path.to_string());
                }
            }
        }

        debug!("{} staged files", files.len());
        Ok(files)
    }

    /// Every path in the index
    pub fn all_files(&self) -> Result<Vec<String>> {
        let index = self.repo.index().context("Failed to read repository index")?;
        let files: Vec<String> = index.iter().map(|entry| path_from_bytes(&entry.path)).collect();

        debug!("{} tracked files", files.len());
        Ok(files)
    }

    /// Files added or modified between two revisions
    pub fn changed_files(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let from_tree = self
            .repo
            .revparse_single(from)
            .and_then(|obj| obj.peel_to_tree())
            .with_context(|| format!("Failed to resolve revision {from}"))?;
        let to_tree = self
            .repo
            .revparse_single(to)
            .and_then(|obj| obj.peel_to_tree())
            .with_context(|| format!("Failed to resolve revision {to}"))?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(0);
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), Some(&mut diff_opts))
            .context("Failed to diff revisions")?;

        let files: Vec<String> = diff
            .deltas()
            .filter(|delta| delta.status() != Delta::Deleted)
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();

        debug!("{} files changed between {} and {}", files.len(), from, to);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn stage(repo: &Repository, paths: &[&str]) {
        let mut index = repo.index().unwrap();
        for path in paths {
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
    }

    fn commit(repo: &Repository, message: &str) -> git2::Oid {
        let mut index = repo.index().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let signature = Signature::now("Hook Tester", "hooks@example.com").unwrap();
        let parents: Vec<git2::Commit> = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    }

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_staged_files() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        write(temp_dir.path(), "aiida/work/launch.py", "x = 1\n");
        write(temp_dir.path(), "aiida/settings.py", "y = 2\n");
        write(temp_dir.path(), "untracked.py", "z = 3\n");
        stage(&repo, &["aiida/work/launch.py", "aiida/settings.py"]);

        let git = GitRepo::discover(temp_dir.path()).unwrap();
        let mut staged = git.staged_files().unwrap();
        staged.sort();
        assert_eq!(staged, vec!["aiida/settings.py", "aiida/work/launch.py"]);
    }

    #[test]
    fn test_all_files_and_changed_files() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        write(temp_dir.path(), ".travis.yml", "language: python\n");
        write(temp_dir.path(), "aiida/settings.py", "y = 2\n");
        stage(&repo, &[".travis.yml", "aiida/settings.py"]);
        let first = commit(&repo, "initial");

        write(temp_dir.path(), "aiida/settings.py", "y = 3\n");
        write(temp_dir.path(), "aiida/orm/utils/node.py", "n = 1\n");
        stage(&repo, &["aiida/settings.py", "aiida/orm/utils/node.py"]);
        let second = commit(&repo, "second");

        let git = GitRepo::discover(temp_dir.path()).unwrap();
        assert_eq!(
            git.all_files().unwrap(),
            vec![".travis.yml", "aiida/orm/utils/node.py", "aiida/settings.py"]
        );

        let mut changed = git
            .changed_files(&first.to_string(), &second.to_string())
            .unwrap();
        changed.sort();
        assert_eq!(changed, vec!["aiida/orm/utils/node.py", "aiida/settings.py"]);
        assert!(git.staged_files().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_revision_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();

        let git = GitRepo::discover(temp_dir.path()).unwrap();
        assert!(git.changed_files("nope", "HEAD").is_err());
    }

    #[test]
    fn test_discover_outside_repository_fails() {
        let temp_dir = TempDir::new().unwrap();
        // A bare temp directory may still sit inside a checkout on some hosts
        if Repository::discover(temp_dir.path()).is_err() {
            assert!(GitRepo::discover(temp_dir.path()).is_err());
        }
    }
}
