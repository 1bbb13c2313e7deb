use super::PathError;
use std::path::{Path, PathBuf};

#[derive(Clone, Default)]
pub struct PathExpander;

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn expand(&self, path: &str) -> Result<PathBuf, PathError> {
        if path.starts_with('~') {
            self.expand_tilde(path)
        } else {
            Ok(Path::new(path).to_path_buf())
        }
    }

    fn expand_tilde(&self, path: &str) -> Result<PathBuf, PathError> {
        if path.len() == 1 {
            return self.home_dir();
        }

        match path[1..].strip_prefix('/') {
            Some(stripped) => {
                let mut home_path = self.home_dir()?;
                for part in stripped.split('/').filter(|p| !p.is_empty()) {
                    home_path.push(part);
                }
                Ok(home_path)
            }
            // "~user" forms are passed through untouched
            None => Ok(Path::new(path).to_path_buf()),
        }
    }

    pub fn home_dir(&self) -> Result<PathBuf, PathError> {
        dirs::home_dir().ok_or(PathError::HomeDirNotFound)
    }
}
