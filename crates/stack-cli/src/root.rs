use std::path::{Path, PathBuf};

use stack_core::paths::CONFIG_FILE;

/// Resolve the workspace root directory.
///
/// Priority:
/// 1. `--root` flag / `STACK_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `repos.yaml`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or(cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("repos.yaml"), "repos: {}\n").unwrap();
        let subdir = dir.path().join("state/archive");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir).unwrap(), dir.path());
    }

    #[test]
    fn no_config_anywhere_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("a/b");
        std::fs::create_dir_all(&subdir).unwrap();
        // An ancestor of the temp dir could hold a repos.yaml; only assert
        // that nothing inside the temp tree is reported.
        if let Some(found) = find_upward(&subdir) {
            assert!(!found.starts_with(dir.path()));
        }
    }
}
