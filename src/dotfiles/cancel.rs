// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Stop tracking dotfiles.
//!
//! Cancelling undoes everything: all tracked files are removed from home,
//! directories left empty by that are removed too, and finally the dotfile
//! repository itself is deleted. The user has to agree twice, once up front,
//! and once more after seeing every file that is about to go.

use crate::{
    dotfiles::{remove_tree, with_paths, Dotfiles, DotfilesError, Result},
    git::{from_top, GitRunner},
    path::cleanup_candidates,
    prompt::Confirm,
};

use std::{
    fs::remove_dir,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Upper bound on bytes of paths given to a single Git call.
const PATHSPEC_LIMIT: usize = 64 * 1024;

impl<G, C> Dotfiles<'_, G, C>
where
    G: GitRunner,
    C: Confirm,
{
    /// Remove all tracked files and the dotfile repository.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::DoesNotExist`] if there is no repository.
    /// - Return [`DotfilesError::Declined`] if user says no at either prompt.
    /// - Return [`DotfilesError::GitFailed`] if submodule deinit or file removal
    ///   fails.
    /// - Return [`DotfilesError::Io`] if the repository cannot be deleted.
    #[instrument(skip(self), level = "debug")]
    pub fn cancel(&mut self) -> Result<i32> {
        let config = self.config;
        if !config.repository.exists() {
            return Err(DotfilesError::DoesNotExist(config.repository.clone()));
        }

        println!(
            "This removes every tracked file from {}, and deletes {}.",
            config.home.display(),
            config.repository.display()
        );
        self.ask("Stop tracking dotfiles?")?;

        let tracked = self.git.tracked_files(&config.repository)?;
        println!("Tracked files:");
        for path in &tracked {
            println!("  {}", path.display());
        }
        self.ask(&format!("Remove these {} files from home?", tracked.len()))?;

        let submodules = self.git.submodules(&config.repository)?;
        if !submodules.is_empty() {
            self.call(from_top(
                config,
                with_paths(["submodule", "deinit", "--force", "--"], &submodules),
            ))?;
        }

        // INVARIANT: Paths untracked since HEAD are left alone, not fatal.
        for chunk in pathspec_chunks(&tracked, PATHSPEC_LIMIT) {
            self.call(from_top(
                config,
                with_paths(["rm", "-f", "--quiet", "--ignore-unmatch", "--"], chunk),
            ))?;
        }
        remove_empty_dirs(&config.home, cleanup_candidates(&config.home, &tracked));
        remove_tree(&config.repository)?;
        info!("removed {:?}", config.repository.display());

        Ok(0)
    }
}

/// Split paths into groups that each fit into one Git call.
///
/// Every group holds at least one path, and at most `limit` bytes of paths
/// unless a single path alone is larger than that.
fn pathspec_chunks(paths: &[PathBuf], limit: usize) -> Vec<&[PathBuf]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = 0;
    for (index, path) in paths.iter().enumerate() {
        let len = path.as_os_str().len() + 1;
        if index > start && size + len > limit {
            chunks.push(&paths[start..index]);
            start = index;
            size = 0;
        }
        size += len;
    }

    if start < paths.len() {
        chunks.push(&paths[start..]);
    }

    chunks
}

/// Remove directories that are empty, and strictly inside the work tree.
///
/// Directories are visited in the given order. Anything that cannot be
/// removed is skipped.
fn remove_empty_dirs(work_tree: &Path, dirs: impl IntoIterator<Item = PathBuf>) {
    for dir in dirs {
        if dir == work_tree || !dir.starts_with(work_tree) {
            debug!("skip {:?}, not inside work tree", dir.display());
            continue;
        }

        match remove_dir(&dir) {
            Ok(()) => info!("removed empty directory {:?}", dir.display()),
            Err(err) => debug!("skip {:?}: {err}", dir.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dotfiles::testing::{config_for, os_args, FakeGit, ScriptedConfirm},
        git::{expand_bin_args, SystemGit},
    };
    use pretty_assertions::assert_eq;
    use std::fs::{create_dir_all, write};

    #[test]
    fn cancel_requires_repository() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let config = config_for(home.path());
        let mut confirm = ScriptedConfirm::answering(&[true, true]);

        let result = Dotfiles::new(&config, FakeGit::default(), &mut confirm).cancel();
        assert!(matches!(result, Err(DotfilesError::DoesNotExist(_))));
        assert!(confirm.asked.is_empty());

        Ok(())
    }

    #[test]
    fn cancel_declined_at_either_prompt_changes_nothing() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let config = config_for(home.path());
        create_dir_all(&config.repository)?;
        write(home.path().join(".bashrc"), "")?;

        for answers in [&[false][..], &[true, false][..]] {
            let git = FakeGit::tracking(&[".bashrc"]);
            let mut confirm = ScriptedConfirm::answering(answers);

            let result = Dotfiles::new(&config, &git, &mut confirm).cancel();
            assert!(matches!(result, Err(DotfilesError::Declined)));
            assert_eq!(confirm.asked.len(), answers.len());
            assert!(git.calls().is_empty());
            assert!(config.repository.exists());
            assert!(home.path().join(".bashrc").exists());
        }

        Ok(())
    }

    #[test]
    fn cancel_removes_tracked_files_and_repository() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let config = config_for(home.path());
        create_dir_all(&config.repository)?;
        create_dir_all(home.path().join(".config/nvim/lua"))?;
        create_dir_all(home.path().join(".config/git"))?;
        write(home.path().join(".config/git/untracked"), "keep me")?;
        let git =
            FakeGit::tracking(&[".bashrc", ".config/git/config", ".config/nvim/lua/opts.lua"]);

        let code =
            Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[true, true])).cancel()?;
        assert_eq!(code, 0);

        let mut rm = os_args(&["-C"]);
        rm.push(home.path().as_os_str().to_owned());
        rm.extend(os_args(&[
            "rm",
            "-f",
            "--quiet",
            "--ignore-unmatch",
            "--",
            ".bashrc",
            ".config/git/config",
            ".config/nvim/lua/opts.lua",
        ]));
        assert_eq!(git.calls(), vec![expand_bin_args(&config, rm)]);

        // Empty directories go deepest first, non-empty ones stay.
        assert!(!home.path().join(".config/nvim").exists());
        assert!(home.path().join(".config/git/untracked").exists());
        assert!(home.path().join(".config").exists());
        assert!(!config.repository.exists());
        assert!(home.path().exists());

        Ok(())
    }

    #[test]
    fn cancel_deinits_submodules_before_removing_files() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let config = config_for(home.path());
        create_dir_all(&config.repository)?;
        let git = FakeGit::tracking(&[".bashrc", ".tmux/plugins/tpm"])
            .with_submodules(&[".tmux/plugins/tpm"]);

        let code =
            Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[true, true])).cancel()?;
        assert_eq!(code, 0);

        let top = |args: &[&str]| {
            let mut call = os_args(&["-C"]);
            call.push(home.path().as_os_str().to_owned());
            call.extend(os_args(args));
            expand_bin_args(&config, call)
        };
        let expect = vec![
            top(&["submodule", "deinit", "--force", "--", ".tmux/plugins/tpm"]),
            top(&["rm", "-f", "--quiet", "--ignore-unmatch", "--", ".bashrc", ".tmux/plugins/tpm"]),
        ];
        assert_eq!(git.calls(), expect);
        assert!(!config.repository.exists());

        Ok(())
    }

    #[test]
    fn cancel_keeps_files_untracked_after_last_commit() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let mut config = config_for(home.path().canonicalize()?);
        config.git = "git".into();
        let git = SystemGit::new(&config.git);
        create_dir_all(config.home.join(".config/x"))?;
        write(config.home.join(".bashrc"), "set -o vi")?;
        write(config.home.join(".config/x/rc"), "x = 1")?;

        let bound = |args: &[&str]| expand_bin_args(&config, from_top(&config, os_args(args)));
        let init = with_paths(["init", "--bare", "--quiet"], [&config.repository]);
        assert_eq!(git.run(&init)?, 0);
        assert_eq!(git.run(&bound(&["add", ".bashrc", ".config/x/rc"]))?, 0);
        let commit = bound(&[
            "-c",
            "user.name=John Doe",
            "-c",
            "user.email=john@doe.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "-m",
            "initial",
        ]);
        assert_eq!(git.run(&commit)?, 0);

        // HEAD still lists .bashrc, but the index no longer does.
        assert_eq!(git.run(&bound(&["rm", "--cached", "--quiet", ".bashrc"]))?, 0);

        let code =
            Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[true, true])).cancel()?;
        assert_eq!(code, 0);
        assert!(config.home.join(".bashrc").exists());
        assert!(!config.home.join(".config").exists());
        assert!(!config.repository.exists());

        Ok(())
    }

    #[test]
    fn pathspec_chunks_split_by_byte_limit() {
        let paths = [PathBuf::from("a"), PathBuf::from("bb"), PathBuf::from("ccc")];
        let result = pathspec_chunks(&paths, 5);
        assert_eq!(result, vec![&paths[..2], &paths[2..]]);

        let result = pathspec_chunks(&paths, 1);
        assert_eq!(result, vec![&paths[..1], &paths[1..2], &paths[2..]]);

        assert!(pathspec_chunks(&[], 5).is_empty());
    }

    #[test]
    fn cancel_with_nothing_tracked_skips_git() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let config = config_for(home.path());
        create_dir_all(&config.repository)?;
        let git = FakeGit::default();

        let code =
            Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[true, true])).cancel()?;
        assert_eq!(code, 0);
        assert!(git.calls().is_empty());
        assert!(!config.repository.exists());

        Ok(())
    }

    #[test]
    fn remove_empty_dirs_never_leaves_work_tree() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let home = root.path().join("home");
        let outside = root.path().join("outside");
        create_dir_all(home.join("a/b"))?;
        create_dir_all(&outside)?;

        let dirs = [home.join("a/b"), home.join("a"), outside.clone(), home.clone()];
        remove_empty_dirs(&home, dirs);
        assert!(!home.join("a").exists());
        assert!(outside.exists());
        assert!(home.exists());

        Ok(())
    }
}
