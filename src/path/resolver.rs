use std::{
    env,
    ffi::OsString,
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

/// Search path used when `PATH` is not set.
const DEFAULT_SEARCH_PATH: &str = "/bin:/usr/bin";

/// Finds the executable a command name refers to.
#[derive(Clone, Debug)]
pub struct PathResolver {
    search_path: Option<OsString>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResolver {
    /// Resolves against the `PATH` of the environment at lookup time.
    pub fn new() -> Self {
        Self { search_path: None }
    }

    #[cfg(test)]
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        // Names with a slash are taken as paths, never searched
        if name.contains('/') {
            let candidate = PathBuf::from(name);
            return is_executable(&candidate).then_some(candidate);
        }

        let search_path = self
            .search_path
            .clone()
            .or_else(|| env::var_os("PATH"))
            .unwrap_or_else(|| OsString::from(DEFAULT_SEARCH_PATH));

        env::split_paths(&search_path)
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_script(dir: &Path, name: &str, mode: u32) -> std::io::Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(mode))?;
        Ok(path)
    }

    #[test]
    fn test_search_order() -> std::io::Result<()> {
        let first = tempfile::tempdir()?;
        let second = tempfile::tempdir()?;
        make_script(second.path(), "tool", 0o755)?;
        let expected = make_script(first.path(), "tool", 0o755)?;

        let search = env::join_paths([first.path(), second.path()])
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let resolver = PathResolver::with_search_path(search);

        assert_eq!(resolver.resolve("tool"), Some(expected));
        Ok(())
    }

    #[test]
    fn test_skips_non_executable() -> std::io::Result<()> {
        let first = tempfile::tempdir()?;
        let second = tempfile::tempdir()?;
        make_script(first.path(), "tool", 0o644)?;
        let expected = make_script(second.path(), "tool", 0o700)?;

        let search = env::join_paths([first.path(), second.path()])
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let resolver = PathResolver::with_search_path(search);

        assert_eq!(resolver.resolve("tool"), Some(expected));
        Ok(())
    }

    #[test]
    fn test_unknown_and_directories() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("subdir"))?;
        let resolver = PathResolver::with_search_path(dir.path());

        assert_eq!(resolver.resolve("no-such-program"), None);
        assert_eq!(resolver.resolve("subdir"), None);
        assert_eq!(resolver.resolve(""), None);
        Ok(())
    }

    #[test]
    fn test_explicit_path() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let script = make_script(dir.path(), "run.sh", 0o755)?;
        let resolver = PathResolver::with_search_path("/nonexistent");

        let name = script.to_string_lossy().into_owned();
        assert_eq!(resolver.resolve(&name), Some(script));
        Ok(())
    }

    #[test]
    fn test_conventional_binary_directory() {
        let resolver = PathResolver::with_search_path(DEFAULT_SEARCH_PATH);
        assert_eq!(
            resolver.resolve("sh").map(|p| p.starts_with("/bin") || p.starts_with("/usr/bin")),
            Some(true)
        );
    }
}
