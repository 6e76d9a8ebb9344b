// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the dotfile repository, the backup
//! location, and user supplied paths that must land inside the work tree.
//! The work tree is always the user's home directory.

use std::path::{Path, PathBuf};

/// Default location of the bare dotfile repository relative to home.
pub const DEFAULT_REPOSITORY: &str = ".local/var/wmdot";

/// Default location of the backup directory relative to home.
pub const DEFAULT_BACKUP: &str = ".local/var/original";

/// Determine default absolute path to the bare dotfile repository.
///
/// Does not check if the path returned actually exists.
pub fn default_repository_dir(home: impl AsRef<Path>) -> PathBuf {
    home.as_ref().join(DEFAULT_REPOSITORY)
}

/// Determine default absolute path to the backup directory.
///
/// Does not check if the path returned actually exists.
pub fn default_backup_dir(home: impl AsRef<Path>) -> PathBuf {
    home.as_ref().join(DEFAULT_BACKUP)
}

/// Determine default absolute path to the settings file.
///
/// Uses `$XDG_CONFIG_HOME/wmdot/config.toml` on Linux, or whatever the
/// platform equivalent is. Returns `None` if no configuration directory can
/// be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_settings_file() -> Option<PathBuf> {
    dirs::config_dir().map(|path| path.join("wmdot").join("config.toml"))
}

/// Strip trailing path separators.
///
/// Rebuilds the path from its components, so `foo/bar///` becomes `foo/bar`
/// and repeated separators in the middle collapse as well. A lone root stays
/// a root.
pub fn strip_trailing_separators(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().components().collect()
}

/// Path that lies inside the work tree.
///
/// Keeps both the absolute form and the form relative to the top-level of
/// the work tree, because Git wants the latter while users want to see the
/// former.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTreePath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl WorkTreePath {
    /// Resolve user supplied path against work tree.
    ///
    /// Relative paths are taken from `cwd`. Only the containing directory
    /// needs to exist, the final component may be missing, e.g., the target
    /// of a new submodule.
    ///
    /// # Errors
    ///
    /// - Return [`PathError::NoFileName`] if path ends in `..` or is a root.
    /// - Return [`PathError::DoesNotExist`] if containing directory is
    ///   missing.
    /// - Return [`PathError::OutsideWorkTree`] if containing directory is not
    ///   inside the work tree.
    pub fn resolve(
        work_tree: impl AsRef<Path>,
        cwd: impl AsRef<Path>,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = strip_trailing_separators(cwd.as_ref().join(path.as_ref()));
        let name = path
            .file_name()
            .ok_or_else(|| PathError::NoFileName { path: path.clone() })?;
        let parent = path.parent().unwrap_or_else(|| Path::new("/"));
        let parent = parent
            .canonicalize()
            .map_err(|err| PathError::DoesNotExist {
                source: err,
                path: parent.to_path_buf(),
            })?;
        let work_tree = work_tree
            .as_ref()
            .canonicalize()
            .map_err(|err| PathError::DoesNotExist {
                source: err,
                path: work_tree.as_ref().to_path_buf(),
            })?;

        let prefix = parent
            .strip_prefix(&work_tree)
            .map_err(|_| PathError::OutsideWorkTree {
                path: path.clone(),
                work_tree: work_tree.clone(),
            })?;
        let relative = prefix.join(name);

        Ok(Self {
            absolute: work_tree.join(&relative),
            relative,
        })
    }

    /// Absolute path inside work tree.
    pub fn absolute(&self) -> &Path {
        self.absolute.as_path()
    }

    /// Path relative to top-level of work tree.
    pub fn relative(&self) -> &Path {
        self.relative.as_path()
    }
}

/// Determine which directories may become empty after removing tracked files.
///
/// Collects every ancestor directory of each tracked file that lies strictly
/// inside the work tree. The result is duplicate free, and sorted in reverse
/// order so that deeper directories always come before their parents.
pub fn cleanup_candidates(
    work_tree: impl AsRef<Path>,
    tracked: impl IntoIterator<Item = impl AsRef<Path>>,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for path in tracked {
        for ancestor in path.as_ref().ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            dirs.push(work_tree.as_ref().join(ancestor));
        }
    }

    dirs.sort();
    dirs.dedup();
    dirs.reverse();
    dirs
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Path does not exist on the file system.
    #[error("{:?} does not exist", path.display())]
    DoesNotExist {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Path lies outside of the work tree.
    #[error("{:?} is not inside work tree {:?}", path.display(), work_tree.display())]
    OutsideWorkTree { path: PathBuf, work_tree: PathBuf },

    /// Path does not name anything, e.g., ends in "..".
    #[error("{:?} does not name a file or directory", path.display())]
    NoFileName { path: PathBuf },
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
