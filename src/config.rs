// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout and resolution.
//!
//! Configuration is resolved exactly once at startup into an immutable
//! [`Config`] that every operation borrows. Values come from three places,
//! highest precedence first:
//!
//! 1. Environment variables, e.g., `WMDOT_REPO` and `WMDOT_BACKUP`.
//! 2. Optional settings file at `$WMDOT_CONFIG`, or
//!    `$XDG_CONFIG_HOME/wmdot/config.toml` when unset.
//! 3. Defaults rooted at the user's home directory.
//!
//! # Settings File Layout
//!
//! ```toml
//! repository = "~/.local/var/wmdot"
//! backup = "$HOME/.local/var/original"
//! remote = "origin"
//! branch = "master"
//! commands = "modules"
//! ```
//!
//! Every field is optional. Path fields go through shell expansion.

use crate::path::{default_backup_dir, default_repository_dir, default_settings_file};

use serde::{Deserialize, Serialize};
use std::{
    env::VarError,
    ffi::OsString,
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Environment variable that overrides the repository location.
pub const REPOSITORY_VAR: &str = "WMDOT_REPO";

/// Environment variable that overrides the backup location.
pub const BACKUP_VAR: &str = "WMDOT_BACKUP";

/// Environment variable that selects the command set.
pub const COMMANDS_VAR: &str = "WMDOT_COMMANDS";

/// Environment variable that points to the settings file.
pub const SETTINGS_VAR: &str = "WMDOT_CONFIG";

/// Available command vocabularies.
///
/// Both vocabularies share the same file and repository commands, but treat
/// submodules differently. The __modules__ set pulls without recursion and
/// always follows up with a recursive submodule update, and offers the `sm-*`
/// family to manage individual submodules. The __classic__ set keeps `pull`
/// free of submodule handling, and offers `pullx` and `reinit` instead.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSet {
    #[default]
    Modules,
    Classic,
}

impl FromStr for CommandSet {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            "modules" => Ok(Self::Modules),
            "classic" => Ok(Self::Classic),
            other => Err(ConfigError::UnknownCommandSet(other.into())),
        }
    }
}

impl Display for CommandSet {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Modules => fmt.write_str("modules"),
            Self::Classic => fmt.write_str("classic"),
        }
    }
}

/// Settings file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Location of bare dotfile repository.
    pub repository: Option<PathBuf>,

    /// Location to move overwritten files into during clone.
    pub backup: Option<PathBuf>,

    /// Remote to push to and pull from.
    pub remote: Option<String>,

    /// Branch to push to and pull from.
    pub branch: Option<String>,

    /// Command vocabulary to use.
    pub commands: Option<CommandSet>,
}

impl Settings {
    /// Load settings file at target path.
    ///
    /// A missing settings file is not an error, default settings are used
    /// instead.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReadSettings`] if file exists but cannot be
    ///   read.
    /// - Return [`ConfigError::Deserialize`] if file content is malformed.
    /// - Return [`ConfigError::ShellExpansion`] if path fields cannot be
    ///   expanded.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string(path) {
            Ok(data) => {
                debug!("load settings from {:?}", path.display());
                data.parse()
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::ReadSettings {
                source: err,
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::from_str(data)?;

        // INVARIANT: Perform shell expansion on all path fields.
        settings.repository = settings.repository.map(expand_path).transpose()?;
        settings.backup = settings.backup.map(expand_path).transpose()?;

        Ok(settings)
    }
}

fn expand_path(path: PathBuf) -> Result<PathBuf> {
    let expanded = shellexpand::full(path.to_string_lossy().as_ref())?.into_owned();
    Ok(PathBuf::from(expanded))
}

/// Fully resolved configuration.
///
/// Constructed once before any command runs, then only ever read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name the program was invoked as, used in help text.
    pub program: String,

    /// Absolute path to Git binary.
    pub git: PathBuf,

    /// Home directory, which doubles as the work tree.
    pub home: PathBuf,

    /// Name of current user.
    pub user: String,

    /// Location of bare dotfile repository.
    pub repository: PathBuf,

    /// Location to move overwritten files into during clone.
    pub backup: PathBuf,

    /// Remote to push to and pull from.
    pub remote: String,

    /// Branch to push to and pull from.
    pub branch: String,

    /// Active command vocabulary.
    pub commands: CommandSet,
}

impl Config {
    /// Resolve configuration from current process environment.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::GitNotFound`] if Git is not on `PATH`.
    /// - Return [`ConfigError::MissingVar`] if `HOME` or `USER` are empty.
    /// - Return [`ConfigError`] if the settings file cannot be loaded.
    #[instrument(skip(program), level = "debug")]
    pub fn from_env(program: impl Into<String>) -> Result<Self> {
        let git = which::which("git").map_err(ConfigError::GitNotFound)?;
        let lookup = |key: &str| std::env::var(key).ok();

        let settings = match lookup(SETTINGS_VAR).filter(|value| !value.is_empty()) {
            Some(path) => Settings::load(path)?,
            None => match default_settings_file() {
                Some(path) => Settings::load(path)?,
                None => Settings::default(),
            },
        };

        let mut config = Self::resolve(program, git, settings, lookup)?;
        for path in [&mut config.repository, &mut config.backup] {
            if let Ok(absolute) = std::path::absolute(&*path) {
                *path = absolute;
            }
        }
        debug!("resolved {config:?}");

        Ok(config)
    }

    /// Resolve configuration from settings and an environment lookup.
    ///
    /// Empty environment values count as unset.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::MissingVar`] if `HOME` or `USER` are empty.
    /// - Return [`ConfigError::UnknownCommandSet`] if `WMDOT_COMMANDS` names
    ///   no known command set.
    pub fn resolve(
        program: impl Into<String>,
        git: impl Into<PathBuf>,
        settings: Settings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let home = PathBuf::from(lookup("HOME").ok_or(ConfigError::MissingVar("HOME"))?);
        let user = lookup("USER").ok_or(ConfigError::MissingVar("USER"))?;

        let repository = lookup(REPOSITORY_VAR)
            .map(PathBuf::from)
            .or(settings.repository)
            .unwrap_or_else(|| default_repository_dir(&home));
        let backup = lookup(BACKUP_VAR)
            .map(PathBuf::from)
            .or(settings.backup)
            .unwrap_or_else(|| default_backup_dir(&home));
        let commands = match lookup(COMMANDS_VAR) {
            Some(value) => value.parse()?,
            None => settings.commands.unwrap_or_default(),
        };

        Ok(Self {
            program: program.into(),
            git: git.into(),
            home,
            user,
            repository,
            backup,
            remote: settings.remote.unwrap_or_else(|| "origin".into()),
            branch: settings.branch.unwrap_or_else(|| "master".into()),
            commands,
        })
    }
}

/// Determine display name of program from how it was invoked.
pub fn program_name(argv0: Option<OsString>) -> String {
    argv0
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wmdot".into())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Git binary cannot be found on `PATH`.
    #[error("git executable not found in PATH")]
    GitNotFound(#[source] which::Error),

    /// Required environment variable is empty or missing.
    #[error("{0} is not set")]
    MissingVar(&'static str),

    /// Command set name is not known.
    #[error("unknown command set {0:?}, expected \"modules\" or \"classic\"")]
    UnknownCommandSet(String),

    /// Settings file exists, but cannot be read.
    #[error("failed to read settings file {:?}", path.display())]
    ReadSettings {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize settings.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to perform shell expansion on settings.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<VarError>),
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
