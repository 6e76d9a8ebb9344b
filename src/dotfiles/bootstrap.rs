// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile repository creation.
//!
//! A dotfile repository is either initialized empty, or cloned from an
//! upstream. Cloning must deal with files in home that already exist at the
//! same paths as tracked files. Those files are moved into the backup
//! location, keeping their paths relative to home, before checkout
//! overwrites anything.

use crate::{
    dotfiles::{remove_tree, with_paths, Dotfiles, DotfilesError, Result},
    git::GitRunner,
    prompt::Confirm,
    rewrite::update_submodules,
};

use mkdirp::mkdirp;
use std::{
    ffi::OsString,
    fs::rename,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

impl<G, C> Dotfiles<'_, G, C>
where
    G: GitRunner,
    C: Confirm,
{
    /// Initialize new empty dotfile repository.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::AlreadyExists`] if repository location is
    ///   taken.
    /// - Return [`DotfilesError::Declined`] if user says no.
    /// - Return [`DotfilesError::GitFailed`] if Git fails to initialize.
    #[instrument(skip(self), level = "debug")]
    pub fn init(&mut self) -> Result<i32> {
        let config = self.config;
        if config.repository.exists() {
            return Err(DotfilesError::AlreadyExists(config.repository.clone()));
        }

        println!("Initialize new dotfile repository");
        println!("  user:       {}", config.user);
        println!("  repository: {}", config.repository.display());
        println!("  work tree:  {}", config.home.display());
        self.ask("Create repository?")?;

        create_dirs(&config.repository)?;
        self.call_unbound(with_paths(["init", "--bare"], [&config.repository]))?;
        info!("initialized {:?}", config.repository.display());

        Ok(0)
    }

    /// Clone dotfile repository from upstream into home.
    ///
    /// Tracked files that would overwrite existing files in home are only
    /// checked out after the user agrees to move the existing files into the
    /// backup location. If the user refuses, the fresh clone is removed as if
    /// it never happened.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::MissingArgument`] if upstream is missing.
    /// - Return [`DotfilesError::AlreadyExists`] if repository location is
    ///   taken.
    /// - Return [`DotfilesError::Declined`] if user refuses backup.
    /// - Return [`DotfilesError::GitFailed`] if any Git call fails.
    /// - Return [`DotfilesError::Io`] if backup fails.
    #[instrument(skip(self), level = "debug")]
    pub fn clone(&mut self, url: Option<&str>) -> Result<i32> {
        let config = self.config;
        let url = url.ok_or(DotfilesError::MissingArgument("<url>"))?;
        if config.repository.exists() {
            return Err(DotfilesError::AlreadyExists(config.repository.clone()));
        }

        println!("Clone dotfile repository");
        println!("  upstream:   {url}");
        println!("  home:       {}", config.home.display());
        println!("  repository: {}", config.repository.display());
        println!("  backup:     {}", config.backup.display());

        self.call_unbound([
            OsString::from("clone"),
            OsString::from("--bare"),
            OsString::from(url),
            config.repository.clone().into_os_string(),
        ])?;

        let tracked = self.git.tracked_files(&config.repository)?;
        let overlaps = find_overlaps(&config.home, &tracked);
        if !overlaps.is_empty() {
            println!("The following files already exist in {}:", config.home.display());
            for path in &overlaps {
                println!("  {}", path.display());
            }

            let question = format!(
                "Move them into {} and continue?",
                config.backup.display()
            );
            if !self.confirm.confirm(&question)? {
                // INVARIANT: Treat clone as if it never happened.
                remove_tree(&config.repository)?;
                return Err(DotfilesError::Declined);
            }

            for path in &overlaps {
                backup_file(&config.home, &config.backup, path)?;
            }
        }

        self.call(["checkout", "--force"])?;
        self.call(update_submodules(config))?;

        Ok(0)
    }
}

/// Select tracked paths that already exist in home.
///
/// Dangling symlinks count as existing, because checkout would still replace
/// them.
pub fn find_overlaps(
    home: impl AsRef<Path>,
    tracked: impl IntoIterator<Item = impl AsRef<Path>>,
) -> Vec<PathBuf> {
    tracked
        .into_iter()
        .filter(|path| home.as_ref().join(path).symlink_metadata().is_ok())
        .map(|path| path.as_ref().to_path_buf())
        .collect()
}

/// Move file from home into backup location, keeping its relative path.
fn backup_file(home: &Path, backup: &Path, path: &Path) -> Result<()> {
    let source = home.join(path);
    let target = backup.join(path);
    if let Some(parent) = target.parent() {
        create_dirs(parent)?;
    }

    rename(&source, &target).map_err(|err| DotfilesError::Io {
        source: err,
        action: "back up",
        path: source.clone(),
    })?;
    info!("moved {:?} to {:?}", source.display(), target.display());

    Ok(())
}

fn create_dirs(path: &Path) -> Result<()> {
    mkdirp(path).map_err(|err| DotfilesError::Io {
        source: err,
        action: "create",
        path: path.to_path_buf(),
    })?;

    Ok(())
}
