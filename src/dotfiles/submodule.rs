// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Submodule management.
//!
//! Submodules are addressed by paths inside home. Every user supplied path
//! is resolved into a [`WorkTreePath`] first, and must be a registered
//! submodule for anything other than adding a new one. Git gets the path
//! relative to the top-level of home, so every call runs from there.

use crate::{
    dotfiles::{remove_tree, with_paths, Dotfiles, DotfilesError, Result},
    git::{from_top, GitRunner},
    path::WorkTreePath,
    prompt::Confirm,
};

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

impl<G, C> Dotfiles<'_, G, C>
where
    G: GitRunner,
    C: Confirm,
{
    /// Print every registered submodule path, one per line.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::Git`] if repository cannot be read.
    pub fn sm_ls(&self) -> Result<i32> {
        for path in self.git.submodules(&self.config.repository)? {
            println!("{}", path.display());
        }

        Ok(0)
    }

    /// Add new submodule at path inside home.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::MissingArgument`] if either argument is
    ///   missing.
    /// - Return [`DotfilesError::Path`] if path is not inside home.
    /// - Return [`DotfilesError::Declined`] if user says no.
    /// - Return [`DotfilesError::GitFailed`] if Git fails.
    #[instrument(skip(self), level = "debug")]
    pub fn sm_add(&mut self, url: Option<&str>, path: Option<&Path>) -> Result<i32> {
        let url = url.ok_or(DotfilesError::MissingArgument("<repo>"))?;
        let path = path.ok_or(DotfilesError::MissingArgument("<path>"))?;
        let target = WorkTreePath::resolve(&self.config.home, &self.cwd, path)?;

        println!("Add submodule");
        println!("  repository: {url}");
        println!("  path:       {}", target.absolute().display());
        self.ask("Add submodule?")?;

        let mut add = vec![OsString::from("submodule"), "add".into(), url.into()];
        add.push(target.relative().as_os_str().to_owned());
        self.call(from_top(self.config, add))?;
        self.call(from_top(
            self.config,
            with_paths(["submodule", "update", "--init", "--recursive", "--"], [target.relative()]),
        ))?;
        info!("added submodule {:?}", target.relative().display());

        Ok(0)
    }

    /// Remove submodules, deleting their files and module storage.
    ///
    /// Each path is confirmed on its own, so saying no stops at that path
    /// but keeps whatever was already removed.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::MissingArgument`] if no paths are given.
    /// - Return [`DotfilesError::NotSubmodule`] if path is not registered.
    /// - Return [`DotfilesError::Declined`] if user says no.
    /// - Return [`DotfilesError::GitFailed`] if Git fails.
    /// - Return [`DotfilesError::Io`] if files cannot be deleted.
    #[instrument(skip(self), level = "debug")]
    pub fn sm_del(&mut self, paths: &[PathBuf]) -> Result<i32> {
        if paths.is_empty() {
            return Err(DotfilesError::MissingArgument("<path>"));
        }

        for path in paths {
            let target = self.registered(path)?;
            self.ask(&format!("Remove submodule {}?", target.absolute().display()))?;

            let relative = target.relative();
            self.call(from_top(
                self.config,
                with_paths(["submodule", "deinit", "--force", "--"], [relative]),
            ))?;
            self.call(from_top(
                self.config,
                with_paths(["rm", "--cached", "-r", "-f", "--quiet", "--"], [relative]),
            ))?;
            remove_tree(target.absolute())?;
            remove_tree(self.config.repository.join("modules").join(relative))?;
            info!("removed submodule {:?}", relative.display());
        }

        Ok(0)
    }

    /// Update submodules to the latest commit of their remote, and stage it.
    ///
    /// Every registered submodule is updated if no paths are given.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::NotSubmodule`] if path is not registered.
    /// - Return [`DotfilesError::GitFailed`] if Git fails.
    #[instrument(skip(self), level = "debug")]
    pub fn sm_update(&self, paths: &[PathBuf]) -> Result<i32> {
        let targets = if paths.is_empty() {
            self.git.submodules(&self.config.repository)?
        } else {
            paths
                .iter()
                .map(|path| self.registered(path).map(|target| target.relative().to_path_buf()))
                .collect::<Result<Vec<_>>>()?
        };

        for relative in &targets {
            self.call(from_top(
                self.config,
                with_paths(["submodule", "update", "--remote", "--recursive", "--"], [relative]),
            ))?;
            self.call(from_top(self.config, with_paths(["add", "--"], [relative])))?;
        }

        Ok(0)
    }

    /// Deinitialize submodules, then initialize them again.
    ///
    /// # Errors
    ///
    /// - Return [`DotfilesError::MissingArgument`] if no paths are given.
    /// - Return [`DotfilesError::NotSubmodule`] if path is not registered.
    /// - Return [`DotfilesError::Declined`] if user says no.
    /// - Return [`DotfilesError::GitFailed`] if Git fails.
    #[instrument(skip(self), level = "debug")]
    pub fn sm_reinit(&mut self, paths: &[PathBuf]) -> Result<i32> {
        if paths.is_empty() {
            return Err(DotfilesError::MissingArgument("<path>"));
        }

        for path in paths {
            let target = self.registered(path)?;
            self.ask(&format!("Reinitialize submodule {}?", target.absolute().display()))?;

            let relative = target.relative();
            self.call(from_top(
                self.config,
                with_paths(["submodule", "deinit", "--force", "--"], [relative]),
            ))?;
            self.call(from_top(
                self.config,
                with_paths(["submodule", "update", "--init", "--recursive", "--"], [relative]),
            ))?;
        }

        Ok(0)
    }

    /// Resolve path, and make sure it names a registered submodule.
    fn registered(&self, path: &Path) -> Result<WorkTreePath> {
        let target = WorkTreePath::resolve(&self.config.home, &self.cwd, path)?;
        let submodules = self.git.submodules(&self.config.repository)?;
        if !submodules.iter().any(|entry| entry == target.relative()) {
            return Err(DotfilesError::NotSubmodule(target.absolute().to_path_buf()));
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        dotfiles::testing::{config_for, os_args, FakeGit, ScriptedConfirm},
        git::expand_bin_args,
    };
    use pretty_assertions::assert_eq;
    use std::fs::{create_dir_all, write};

    fn top(config: &Config, args: &[&str]) -> Vec<OsString> {
        expand_bin_args(config, from_top(config, os_args(args)))
    }

    /// Home with a registered submodule checked out at `.vim/pack/plugin`.
    fn home_with_plugin() -> anyhow::Result<(tempfile::TempDir, Config)> {
        let home = tempfile::tempdir()?;
        let config = config_for(home.path().canonicalize()?);
        create_dir_all(config.home.join(".vim/pack/plugin"))?;
        write(config.home.join(".vim/pack/plugin/plugin.vim"), "")?;
        create_dir_all(config.repository.join("modules/.vim/pack/plugin"))?;

        Ok((home, config))
    }

    #[test]
    fn sm_add_runs_from_top_of_home() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default();
        let cwd = config.home.join(".vim");

        let code = Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[true]))
            .with_cwd(&cwd)
            .sm_add(Some("https://example.org/ale.git"), Some(Path::new("pack/ale/")))?;
        assert_eq!(code, 0);

        let expect = vec![
            top(&config, &["submodule", "add", "https://example.org/ale.git", ".vim/pack/ale"]),
            top(&config, &["submodule", "update", "--init", "--recursive", "--", ".vim/pack/ale"]),
        ];
        assert_eq!(git.calls(), expect);

        Ok(())
    }

    #[test]
    fn sm_add_requires_arguments() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default();
        let mut dotfiles = Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[true]));

        let result = dotfiles.sm_add(None, None);
        assert!(matches!(result, Err(DotfilesError::MissingArgument("<repo>"))));
        let result = dotfiles.sm_add(Some("https://example.org/ale.git"), None);
        assert!(matches!(result, Err(DotfilesError::MissingArgument("<path>"))));
        assert!(git.calls().is_empty());

        Ok(())
    }

    #[test]
    fn sm_add_rejects_missing_parent_before_asking() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default();
        let mut confirm = ScriptedConfirm::answering(&[true]);

        let result = Dotfiles::new(&config, &git, &mut confirm)
            .sm_add(Some("https://example.org/ale.git"), Some(Path::new("nope/ale")));
        assert!(matches!(result, Err(DotfilesError::Path(_))));
        assert!(confirm.asked.is_empty());
        assert!(git.calls().is_empty());

        Ok(())
    }

    #[test]
    fn sm_del_removes_submodule_and_storage() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default().with_submodules(&[".vim/pack/plugin"]);

        let code = Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[true]))
            .sm_del(&[PathBuf::from(".vim/pack/plugin/")])?;
        assert_eq!(code, 0);

        let expect = vec![
            top(&config, &["submodule", "deinit", "--force", "--", ".vim/pack/plugin"]),
            top(&config, &["rm", "--cached", "-r", "-f", "--quiet", "--", ".vim/pack/plugin"]),
        ];
        assert_eq!(git.calls(), expect);
        assert!(!config.home.join(".vim/pack/plugin").exists());
        assert!(!config.repository.join("modules/.vim/pack/plugin").exists());
        assert!(config.home.join(".vim/pack").exists());

        Ok(())
    }

    #[test]
    fn sm_del_rejects_unregistered_path_before_mutation() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default().with_submodules(&[".tmux/plugins/tpm"]);
        let mut confirm = ScriptedConfirm::answering(&[true]);

        let result = Dotfiles::new(&config, &git, &mut confirm)
            .sm_del(&[PathBuf::from(".vim/pack/plugin")]);
        match result {
            Err(DotfilesError::NotSubmodule(path)) => {
                assert_eq!(path, config.home.join(".vim/pack/plugin"));
            }
            other => panic!("expected NotSubmodule, got {other:?}"),
        }
        assert!(confirm.asked.is_empty());
        assert!(git.calls().is_empty());
        assert!(config.home.join(".vim/pack/plugin/plugin.vim").exists());

        Ok(())
    }

    #[test]
    fn sm_del_declined_keeps_submodule() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default().with_submodules(&[".vim/pack/plugin"]);

        let result = Dotfiles::new(&config, &git, ScriptedConfirm::answering(&[false]))
            .sm_del(&[PathBuf::from(".vim/pack/plugin")]);
        assert!(matches!(result, Err(DotfilesError::Declined)));
        assert!(git.calls().is_empty());
        assert!(config.home.join(".vim/pack/plugin").exists());

        Ok(())
    }

    #[test]
    fn sm_del_requires_paths() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let result =
            Dotfiles::new(&config, FakeGit::default(), ScriptedConfirm::default()).sm_del(&[]);
        assert!(matches!(result, Err(DotfilesError::MissingArgument("<path>"))));

        Ok(())
    }

    #[test]
    fn sm_update_everything_without_paths() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default().with_submodules(&[".tmux/plugins/tpm", ".vim/pack/plugin"]);

        let code = Dotfiles::new(&config, &git, ScriptedConfirm::default()).sm_update(&[])?;
        assert_eq!(code, 0);

        let expect = vec![
            top(
                &config,
                &["submodule", "update", "--remote", "--recursive", "--", ".tmux/plugins/tpm"],
            ),
            top(&config, &["add", "--", ".tmux/plugins/tpm"]),
            top(
                &config,
                &["submodule", "update", "--remote", "--recursive", "--", ".vim/pack/plugin"],
            ),
            top(&config, &["add", "--", ".vim/pack/plugin"]),
        ];
        assert_eq!(git.calls(), expect);

        Ok(())
    }

    #[test]
    fn sm_update_verifies_given_paths_first() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        create_dir_all(config.home.join(".tmux/plugins"))?;
        let git = FakeGit::default().with_submodules(&[".vim/pack/plugin"]);

        let result = Dotfiles::new(&config, &git, ScriptedConfirm::default())
            .sm_update(&[PathBuf::from(".vim/pack/plugin"), PathBuf::from(".tmux/plugins/tpm")]);
        assert!(matches!(result, Err(DotfilesError::NotSubmodule(_))));
        assert!(git.calls().is_empty());

        Ok(())
    }

    #[test]
    fn sm_update_stops_at_git_failure() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default()
            .with_submodules(&[".tmux/plugins/tpm", ".vim/pack/plugin"])
            .failing(0, 1);

        let result = Dotfiles::new(&config, &git, ScriptedConfirm::default()).sm_update(&[]);
        assert!(matches!(result, Err(DotfilesError::GitFailed(1))));
        assert_eq!(git.calls().len(), 1);

        Ok(())
    }

    #[test]
    fn sm_reinit_deinits_then_updates() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let git = FakeGit::default().with_submodules(&[".vim/pack/plugin"]);
        let mut confirm = ScriptedConfirm::answering(&[true]);

        let code = Dotfiles::new(&config, &git, &mut confirm)
            .with_cwd(config.home.join(".vim/pack"))
            .sm_reinit(&[PathBuf::from("plugin")])?;
        assert_eq!(code, 0);
        assert_eq!(confirm.asked.len(), 1);

        let expect = vec![
            top(&config, &["submodule", "deinit", "--force", "--", ".vim/pack/plugin"]),
            top(
                &config,
                &["submodule", "update", "--init", "--recursive", "--", ".vim/pack/plugin"],
            ),
        ];
        assert_eq!(git.calls(), expect);

        Ok(())
    }

    #[test]
    fn sm_reinit_requires_paths() -> anyhow::Result<()> {
        let (_home, config) = home_with_plugin()?;
        let result =
            Dotfiles::new(&config, FakeGit::default(), ScriptedConfirm::default()).sm_reinit(&[]);
        assert!(matches!(result, Err(DotfilesError::MissingArgument("<path>"))));

        Ok(())
    }
}
