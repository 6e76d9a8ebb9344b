// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use wmdot::{
    config::{program_name, CommandSet, Config},
    dotfiles::{Dotfiles, DotfilesError},
    git::SystemGit,
    prompt::TerminalConfirm,
    usage,
};

use anyhow::Result;
use clap::{error::ErrorKind, Parser, Subcommand};
use std::{
    env::{args_os, current_dir},
    ffi::OsString,
    io::stderr,
    path::PathBuf,
    process::exit,
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Show usage document.
    #[arg(short, long)]
    pub help: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Create new empty dotfile repository.
    Init,

    /// Clone dotfile repository from upstream.
    Clone { url: Option<String> },

    /// Remove all tracked files and the dotfile repository.
    Cancel,

    /// Show usage document.
    Help,

    /// List all submodules.
    SmLs,

    /// Add submodule at path inside home.
    SmAdd {
        repo: Option<String>,
        path: Option<PathBuf>,
    },

    /// Remove submodules.
    SmDel { paths: Vec<PathBuf> },

    /// Update submodules to their remote.
    SmUpdate { paths: Vec<PathBuf> },

    /// Deinitialize submodules, then initialize them again.
    SmReinit { paths: Vec<PathBuf> },

    /// Anything else is rewritten into Git calls.
    #[command(external_subcommand)]
    External(Vec<OsString>),
}

impl Command {
    /// Name of subcommand if it belongs to the `sm-*` family.
    fn submodule_name(&self) -> Option<&'static str> {
        match self {
            Self::SmLs => Some("sm-ls"),
            Self::SmAdd { .. } => Some("sm-add"),
            Self::SmDel { .. } => Some("sm-del"),
            Self::SmUpdate { .. } => Some("sm-update"),
            Self::SmReinit { .. } => Some("sm-reinit"),
            _ => None,
        }
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match run() {
        Ok(code) => exit(code),
        Err(error) => {
            error!("{error:?}");
            let code = error
                .downcast_ref::<DotfilesError>()
                .map_or(1, DotfilesError::exit_code);
            exit(code)
        }
    }
}

fn run() -> Result<i32> {
    let args = args_os().collect::<Vec<_>>();
    let config = Config::from_env(program_name(args.first().cloned()))?;

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            print!("{}", usage::render(&config, None));
            return Ok(1);
        }
        Err(err) => {
            let message = err.to_string();
            let message = message.lines().next().unwrap_or_default();
            eprint!("{}", usage::render(&config, Some(message)));
            return Ok(1);
        }
    };

    if cli.help {
        print!("{}", usage::render(&config, None));
        return Ok(1);
    }

    let Some(command) = cli.command else {
        eprint!("{}", usage::render(&config, None));
        return Ok(1);
    };

    match dispatch(&config, command) {
        Err(DotfilesError::UnrecognizedCommand(name)) => {
            let message = format!("unrecognized command '{name}'");
            eprint!("{}", usage::render(&config, Some(message.as_str())));
            Ok(1)
        }
        result => Ok(result?),
    }
}

fn dispatch(config: &Config, command: Command) -> Result<i32, DotfilesError> {
    if let Some(name) = command.submodule_name() {
        if config.commands == CommandSet::Classic {
            return Err(DotfilesError::UnrecognizedCommand(name.into()));
        }
    }

    let cwd = current_dir().unwrap_or_else(|_| config.home.clone());
    let mut dotfiles =
        Dotfiles::new(config, SystemGit::new(&config.git), TerminalConfirm::new()).with_cwd(cwd);

    match command {
        Command::Init => dotfiles.init(),
        Command::Clone { url } => dotfiles.clone(url.as_deref()),
        Command::Cancel => dotfiles.cancel(),
        Command::Help => {
            print!("{}", usage::render(config, None));
            Ok(1)
        }
        Command::SmLs => dotfiles.sm_ls(),
        Command::SmAdd { repo, path } => dotfiles.sm_add(repo.as_deref(), path.as_deref()),
        Command::SmDel { paths } => dotfiles.sm_del(&paths),
        Command::SmUpdate { paths } => dotfiles.sm_update(&paths),
        Command::SmReinit { paths } => dotfiles.sm_reinit(&paths),
        Command::External(args) => {
            let mut args = args.into_iter();
            let name = args.next().unwrap_or_default();
            dotfiles.passthrough(&name.to_string_lossy(), args.collect())
        }
    }
}
