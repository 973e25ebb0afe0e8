//! Filesystem access for glob resolution.
//!
//! The resolver is generic over [`GlobFs`], a minimal read-only filesystem
//! abstraction. [`OsFs`] is the std-backed implementation; tests use an
//! in-memory filesystem with directory-symlink support.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors from filesystem operations during resolution.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Minimal read-only filesystem abstraction.
///
/// Implement this trait to resolve globs against something other than the
/// host filesystem (an in-memory tree, an overlay, a VFS layer).
pub trait GlobFs {
    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path is a symbolic link (without following it).
    fn is_symlink(&self, path: &Path) -> bool;

    /// List the entry names in a directory (names only, order unspecified).
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl GlobFs for OsFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let entries = fs::read_dir(path).map_err(|err| io_error(path, err))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| io_error(path, err))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

fn io_error(path: &Path, err: io::Error) -> FsError {
    let shown = path.display().to_string();
    match err.kind() {
        io::ErrorKind::NotFound => FsError::NotFound(shown),
        io::ErrorKind::NotADirectory => FsError::NotADirectory(shown),
        io::ErrorKind::PermissionDenied => FsError::PermissionDenied(shown),
        _ => FsError::Io(format!("{shown}: {err}")),
    }
}

/// In-memory filesystem for unit tests.
///
/// Supports files, directories, directory symlinks, and per-directory
/// permission denial.
#[cfg(test)]
pub(crate) mod memory {
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};

    use super::{FsError, GlobFs};

    #[derive(Debug, Default)]
    pub(crate) struct MemoryFs {
        files: HashSet<PathBuf>,
        dirs: HashSet<PathBuf>,
        /// Symlink path -> target path (directory symlinks).
        symlinks: HashMap<PathBuf, PathBuf>,
        /// Directories that refuse to be listed.
        denied: HashSet<PathBuf>,
    }

    impl MemoryFs {
        pub(crate) fn new() -> Self {
            let mut fs = Self::default();
            fs.dirs.insert(PathBuf::from("/"));
            fs
        }

        pub(crate) fn add_file(&mut self, path: &str) {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent() {
                self.ensure_dirs(parent);
            }
            self.files.insert(path);
        }

        pub(crate) fn add_dir(&mut self, path: &str) {
            self.ensure_dirs(Path::new(path));
        }

        /// Add a directory symlink: `link` points to `target`. The link
        /// appears as a directory entry under its parent.
        pub(crate) fn add_dir_symlink(&mut self, link: &str, target: &str) {
            let link = PathBuf::from(link);
            if let Some(parent) = link.parent() {
                self.ensure_dirs(parent);
            }
            self.dirs.insert(link.clone());
            self.symlinks.insert(link, PathBuf::from(target));
        }

        /// Make a directory unlistable.
        pub(crate) fn deny(&mut self, path: &str) {
            self.denied.insert(PathBuf::from(path));
        }

        fn ensure_dirs(&mut self, path: &Path) {
            let mut current = PathBuf::new();
            for component in path.components() {
                current.push(component);
                self.dirs.insert(current.clone());
            }
        }

        /// Resolve intermediate symlinks the way a real filesystem would.
        fn resolve(&self, path: &Path) -> PathBuf {
            let mut resolved = PathBuf::new();
            for component in path.components() {
                resolved.push(component);
                if let Some(target) = self.symlinks.get(&resolved) {
                    resolved = target.clone();
                }
            }
            resolved
        }
    }

    impl GlobFs for MemoryFs {
        fn exists(&self, path: &Path) -> bool {
            let resolved = self.resolve(path);
            self.files.contains(&resolved) || self.dirs.contains(&resolved)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.contains(&self.resolve(path))
        }

        fn is_symlink(&self, path: &Path) -> bool {
            self.symlinks.contains_key(path)
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
            let resolved = self.resolve(path);
            if self.denied.contains(&resolved) {
                return Err(FsError::PermissionDenied(resolved.display().to_string()));
            }
            if !self.dirs.contains(&resolved) {
                return Err(FsError::NotFound(resolved.display().to_string()));
            }

            let mut names = Vec::new();
            for file in &self.files {
                if file.parent() == Some(resolved.as_path()) {
                    if let Some(name) = file.file_name() {
                        names.push(name.to_string_lossy().into_owned());
                    }
                }
            }
            for dir in &self.dirs {
                if dir.parent() == Some(resolved.as_path()) && dir != &resolved {
                    if let Some(name) = dir.file_name() {
                        names.push(name.to_string_lossy().into_owned());
                    }
                }
            }
            Ok(names)
        }
    }
}
