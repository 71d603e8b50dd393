//! Log file path resolution
//!
//! Turns the user supplied file name into the absolute active path, its
//! directory and its base name, and derives the staging and archive names
//! from them:
//!
//! ```text
//! D/B                   active file
//! D/B.tmp               staging file (only during rotation)
//! D/B.YYYY-MM-DD.NNN    archived file, NNN zero-padded, 000 newest
//! ```

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SinkError};

/// Suffix of the staging file
pub const STAGING_SUFFIX: &str = "tmp";

/// Absolute location of the active log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    dir: PathBuf,
    base: String,
}

impl ResolvedPath {
    /// Resolve a relative or absolute file name
    ///
    /// Relative names are joined onto the current working directory and the
    /// result is cleaned lexically (`.` and `..` removed). Symlinks are not
    /// followed.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Path` if the working directory is unavailable or
    /// the name has no usable final component.
    pub fn resolve(name: impl AsRef<Path>) -> Result<Self> {
        let name = name.as_ref();
        let joined = if name.is_absolute() {
            name.to_path_buf()
        } else {
            let cwd = env::current_dir()
                .map_err(|e| SinkError::path(name, format!("working directory: {e}")))?;
            cwd.join(name)
        };

        let path = clean(&joined);
        let base = path
            .file_name()
            .ok_or_else(|| SinkError::path(name, "no file name"))?
            .to_str()
            .ok_or_else(|| SinkError::path(name, "file name is not valid UTF-8"))?
            .to_string();
        let dir = path
            .parent()
            .ok_or_else(|| SinkError::path(name, "no parent directory"))?
            .to_path_buf();

        Ok(Self { path, dir, base })
    }

    /// Absolute path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the active file and its archives
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of the active file
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `D/B.tmp`
    pub fn staging_path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.base, STAGING_SUFFIX))
    }

    /// `B.YYYY-MM-DD`, the name prefix shared by one day's archives
    pub fn archive_prefix(&self, date: &str) -> String {
        format!("{}.{}", self.base, date)
    }

    /// `D/B.YYYY-MM-DD.NNN`
    pub fn archive_path(&self, date: &str, sequence: u32) -> PathBuf {
        self.dir
            .join(format!("{}.{:03}", self.archive_prefix(date), sequence))
    }
}

/// Lexically normalize an absolute path
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let resolved = ResolvedPath::resolve("try.log").unwrap();
        let cwd = env::current_dir().unwrap();

        assert_eq!(resolved.path(), cwd.join("try.log"));
        assert_eq!(resolved.dir(), cwd);
        assert_eq!(resolved.base(), "try.log");
    }

    #[test]
    fn test_resolve_absolute_cleans_dots() {
        let resolved = ResolvedPath::resolve("/var/log/./app/../svc.log").unwrap();

        assert_eq!(resolved.path(), Path::new("/var/log/svc.log"));
        assert_eq!(resolved.dir(), Path::new("/var/log"));
        assert_eq!(resolved.base(), "svc.log");
    }

    #[test]
    fn test_resolve_root_fails() {
        let err = ResolvedPath::resolve("/").unwrap_err();
        assert!(matches!(err, SinkError::Path { .. }));
    }

    #[test]
    fn test_resolve_trailing_parent_fails() {
        assert!(ResolvedPath::resolve("/..").is_err());
    }

    #[test]
    fn test_derived_names() {
        let resolved = ResolvedPath::resolve("/data/logs/try.log").unwrap();

        assert_eq!(resolved.staging_path(), Path::new("/data/logs/try.log.tmp"));
        assert_eq!(resolved.archive_prefix("2024-01-01"), "try.log.2024-01-01");
        assert_eq!(
            resolved.archive_path("2024-01-01", 0),
            Path::new("/data/logs/try.log.2024-01-01.000")
        );
        assert_eq!(
            resolved.archive_path("2024-01-01", 42),
            Path::new("/data/logs/try.log.2024-01-01.042")
        );
    }
}
