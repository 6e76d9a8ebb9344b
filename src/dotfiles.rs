// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile operations.
//!
//! Tracks dotfiles of the user's home directory through a __bare-alias__
//! repository. Although bare repositories lack a working tree by definition,
//! Git allows users to force a working tree by designating a directory as an
//! alias for a working tree using the "--work-tree" argument. This lets us
//! treat the entire home directory as a Git repository without needing to
//! initialize it as one.
//!
//! # Operations
//!
//! Every operation goes through [`Dotfiles`], which owns the two seams that
//! touch the outside world: a [`GitRunner`] to run Git, and a [`Confirm`] to
//! ask the user before doing anything destructive. Operations never exit
//! the process. They return the exit code to use, or a [`DotfilesError`] that
//! knows its own exit code.
//!
//! - [`bootstrap`]: create or clone the dotfile repository.
//! - [`cancel`]: stop tracking dotfiles altogether.
//! - [`submodule`]: manage individual submodules.
//! - [`Dotfiles::passthrough`]: everything else, by rewriting into Git calls.

pub mod bootstrap;
pub mod cancel;
pub mod submodule;

use crate::{
    config::Config,
    git::{expand_bin_args, GitError, GitRunner},
    path::PathError,
    prompt::{Confirm, PromptError},
    rewrite::{rewrite, Plan},
};

use std::{
    ffi::OsString,
    fs::remove_dir_all,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Dotfile repository of the current user.
#[derive(Debug)]
pub struct Dotfiles<'cfg, G, C>
where
    G: GitRunner,
    C: Confirm,
{
    pub(crate) config: &'cfg Config,
    pub(crate) git: G,
    pub(crate) confirm: C,
    pub(crate) cwd: PathBuf,
}

impl<'cfg, G, C> Dotfiles<'cfg, G, C>
where
    G: GitRunner,
    C: Confirm,
{
    /// Construct new dotfile handle.
    ///
    /// User supplied paths are taken relative to the home directory until
    /// [`Dotfiles::with_cwd`] says otherwise.
    pub fn new(config: &'cfg Config, git: G, confirm: C) -> Self {
        Self {
            config,
            git,
            confirm,
            cwd: config.home.clone(),
        }
    }

    /// Set directory that relative user supplied paths are taken from.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Rewrite subcommand into Git calls, and run them.
    ///
    /// Calls run one after another against the dotfile repository. The
    /// first call to fail stops the rest, and its exit code is returned.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::UnrecognizedCommand`] if subcommand is not
    ///   part of the active command set.
    /// - Return [`DotfilesError::Git`] if Git cannot be run at all.
    #[instrument(skip(self, args), level = "debug")]
    pub fn passthrough(&self, name: &str, args: Vec<OsString>) -> Result<i32> {
        let plan = rewrite(self.config, name, args)
            .ok_or_else(|| DotfilesError::UnrecognizedCommand(name.into()))?;
        self.run_plan(plan)
    }

    fn run_plan(&self, plan: Plan) -> Result<i32> {
        for step in plan {
            let code = self.git.run(&expand_bin_args(self.config, step))?;
            if code != 0 {
                debug!("stop plan, git exited with {code}");
                return Ok(code);
            }
        }

        Ok(0)
    }

    /// Call Git against dotfile repository, failing on non-zero exit code.
    pub(crate) fn call(&self, args: impl IntoIterator<Item = impl Into<OsString>>) -> Result<()> {
        check(self.git.run(&expand_bin_args(self.config, args))?)
    }

    /// Call Git without binding it to the dotfile repository.
    pub(crate) fn call_unbound(
        &self,
        args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Result<()> {
        let args = args.into_iter().map(Into::into).collect::<Vec<OsString>>();
        check(self.git.run(&args)?)
    }

    /// Ask user to confirm, treating a no as abort.
    pub(crate) fn ask(&mut self, question: &str) -> Result<()> {
        if self.confirm.confirm(question)? {
            return Ok(());
        }

        Err(DotfilesError::Declined)
    }
}

fn check(code: i32) -> Result<()> {
    if code != 0 {
        return Err(DotfilesError::GitFailed(code));
    }

    Ok(())
}

/// Remove directory and everything in it, if it exists.
pub(crate) fn remove_tree(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.symlink_metadata().is_err() {
        return Ok(());
    }

    debug!("remove {:?}", path.display());
    remove_dir_all(path).map_err(|err| DotfilesError::Io {
        source: err,
        action: "remove",
        path: path.to_path_buf(),
    })
}

/// Build Git arguments out of fixed words followed by paths.
pub(crate) fn with_paths<'a>(
    head: impl IntoIterator<Item = &'a str>,
    paths: impl IntoIterator<Item = impl AsRef<Path>>,
) -> Vec<OsString> {
    head.into_iter()
        .map(OsString::from)
        .chain(paths.into_iter().map(|path| path.as_ref().as_os_str().to_owned()))
        .collect()
}

/// All possible error types for dotfile operations.
#[derive(Debug, thiserror::Error)]
pub enum DotfilesError {
    /// Required command line argument is missing.
    #[error("missing required argument {0}")]
    MissingArgument(&'static str),

    /// Path must not exist for operation to proceed.
    #[error("{:?} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Path must exist for operation to proceed.
    #[error("{:?} does not exist", .0.display())]
    DoesNotExist(PathBuf),

    /// Path is not a registered submodule.
    #[error("{:?} is not a registered submodule", .0.display())]
    NotSubmodule(PathBuf),

    /// Subcommand is not part of the active command set.
    #[error("unrecognized command {0:?}")]
    UnrecognizedCommand(String),

    /// User said no.
    #[error("aborted by user")]
    Declined,

    /// Git ran, but exited with non-zero exit code.
    #[error("git exited with status {0}")]
    GitFailed(i32),

    /// File system manipulation fails.
    #[error("failed to {action} {:?}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        action: &'static str,
        path: PathBuf,
    },

    /// Git could not be run, or repository could not be read.
    #[error(transparent)]
    Git(#[from] GitError),

    /// User supplied path is unusable.
    #[error(transparent)]
    Path(#[from] PathError),

    /// User could not be asked.
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl DotfilesError {
    /// Exit code to leave the process with.
    ///
    /// Failed Git calls pass on the exit code of Git, everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::GitFailed(code) => *code,
            _ => 1,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = DotfilesError> = std::result::Result<T, E>;
