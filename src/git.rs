// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git invocation.
//!
//! All changes to the dotfile repository are made by the real Git binary.
//! The dotfile repository is a __bare-alias__ repository: a bare repository
//! whose work tree is forced to be the user's home directory through the
//! "--git-dir" and "--work-tree" arguments. Thus, every call made against
//! the dotfile repository is expanded with those two arguments first.
//!
//! Listing tracked files and registered submodules only needs to read the
//! repository, which is done in process through libgit2.
//!
//! # See Also
//!
//! 1. [ArchWiki - dotfiles](https://wiki.archlinux.org/title/Dotfiles#Tracking_dotfiles_directly_with_Git)

use crate::config::Config;

use git2::{ErrorCode, ObjectType, Repository};
use std::{
    collections::VecDeque,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use tracing::{debug, instrument};

/// File mode Git gives to submodule entries.
const GITLINK_MODE: u32 = 0o160000;

/// Run Git, and inspect the dotfile repository.
pub trait GitRunner {
    /// Run Git with exact arguments, attached to the current terminal.
    ///
    /// Blocks until Git exits. Returns the exit code of Git, where a non-zero
    /// exit code is _not_ treated as an error.
    fn run(&self, args: &[OsString]) -> Result<i32>;

    /// List paths of all files and submodules tracked at `HEAD`.
    ///
    /// Matches what `ls-tree -r HEAD` shows. An unborn `HEAD` has no tracked
    /// files.
    fn tracked_files(&self, gitdir: &Path) -> Result<Vec<PathBuf>>;

    /// List paths of all registered submodules.
    fn submodules(&self, gitdir: &Path) -> Result<Vec<PathBuf>>;
}

impl<G> GitRunner for &G
where
    G: GitRunner + ?Sized,
{
    fn run(&self, args: &[OsString]) -> Result<i32> {
        (**self).run(args)
    }

    fn tracked_files(&self, gitdir: &Path) -> Result<Vec<PathBuf>> {
        (**self).tracked_files(gitdir)
    }

    fn submodules(&self, gitdir: &Path) -> Result<Vec<PathBuf>> {
        (**self).submodules(gitdir)
    }
}

/// Git through the system binary.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl SystemGit {
    /// Construct new system Git runner for binary at target path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl GitRunner for SystemGit {
    #[instrument(skip(self, args), level = "debug")]
    fn run(&self, args: &[OsString]) -> Result<i32> {
        debug!("run {:?} with {args:?}", self.program.display());
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|err| GitError::Spawn {
                source: err,
                program: self.program.clone(),
            })?;

        Ok(exit_code(status))
    }

    // Thank you Eric at https://www.hydrogen18.com/blog/list-all-files-git-repo-pygit2.html.
    fn tracked_files(&self, gitdir: &Path) -> Result<Vec<PathBuf>> {
        let repository = Repository::open_bare(gitdir)?;
        let commit = match repository.head() {
            Ok(head) => head.peel_to_commit()?,
            Err(err) if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::new();
        let mut trees_and_paths = VecDeque::new();
        trees_and_paths.push_front((commit.tree()?, PathBuf::new()));

        // Use DFS to traverse tree.
        while let Some((tree, path)) = trees_and_paths.pop_front() {
            for tree_entry in &tree {
                match tree_entry.kind() {
                    // INVARIANT: Hit a tree? Traverse it!
                    Some(ObjectType::Tree) => {
                        let next_tree = repository.find_tree(tree_entry.id())?;
                        let next_path = path.join(bytes_to_path(tree_entry.name_bytes()));
                        trees_and_paths.push_front((next_tree, next_path));
                    }
                    // INVARIANT: Hit a blob or submodule? Record our current path!
                    Some(ObjectType::Blob | ObjectType::Commit) => {
                        entries.push(path.join(bytes_to_path(tree_entry.name_bytes())));
                    }
                    _ => continue,
                }
            }
        }

        entries.sort();
        Ok(entries)
    }

    fn submodules(&self, gitdir: &Path) -> Result<Vec<PathBuf>> {
        let repository = Repository::open_bare(gitdir)?;
        let index = repository.index()?;
        let mut paths = index
            .iter()
            .filter(|entry| entry.mode == GITLINK_MODE)
            .map(|entry| bytes_to_path(&entry.path))
            .collect::<Vec<_>>();
        paths.sort();
        paths.dedup();

        Ok(paths)
    }
}

/// Bind arguments to dotfile repository and home directory work tree.
pub fn expand_bin_args(
    config: &Config,
    args: impl IntoIterator<Item = impl Into<OsString>>,
) -> Vec<OsString> {
    let mut bin_args: Vec<OsString> = vec![
        "--git-dir".into(),
        config.repository.clone().into_os_string(),
        "--work-tree".into(),
        config.home.clone().into_os_string(),
    ];
    bin_args.extend(args.into_iter().map(Into::into));

    bin_args
}

/// Make Git run from the top-level of the work tree.
///
/// Needed for calls that take paths relative to the top-level of the work
/// tree, regardless of where the user currently is.
pub fn from_top(
    config: &Config,
    args: impl IntoIterator<Item = impl Into<OsString>>,
) -> Vec<OsString> {
    let mut bin_args: Vec<OsString> = vec!["-C".into(), config.home.clone().into_os_string()];
    bin_args.extend(args.into_iter().map(Into::into));

    bin_args
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

// Thanks from:
//
// https://github.com/rust-lang/git2-rs/blob/5bc3baa9694a94db2ca9cc256b5bce8a215f9013/
// src/util.rs#L85
#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::prelude::*;
    PathBuf::from(OsStr::from_bytes(bytes))
}
#[cfg(windows)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(OsStr::new(String::from_utf8_lossy(bytes).as_ref()))
}

/// Git invocation error types.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// Git binary could not be started.
    #[error("failed to run {:?}", program.display())]
    Spawn {
        #[source]
        source: std::io::Error,
        program: PathBuf,
    },

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = GitError> = std::result::Result<T, E>;
