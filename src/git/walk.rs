use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::Path;

/// List regular files under `root` outside of a git checkout, honouring
/// `.gitignore` files but not hiding dotfiles.
pub fn walk_files<P: AsRef<Path>>(root: P) -> Result<Vec<String>> {
    let root = root.as_ref();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walk_files_respects_gitignore() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("aiida/work")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join(".gitignore"), "build/\n*.pyc\n").unwrap();
        fs::write(root.join(".travis.yml"), "language: python\n").unwrap();
        fs::write(root.join("aiida/work/launch.py"), "x = 1\n").unwrap();
        fs::write(root.join("aiida/work/launch.pyc"), "junk").unwrap();
        fs::write(root.join("build/out.py"), "x = 1\n").unwrap();

        let files = walk_files(root).unwrap();
        assert_eq!(files, vec![".gitignore", ".travis.yml", "aiida/work/launch.py"]);
    }
}
