// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Usage document.
//!
//! One fixed document lists every subcommand of the active command set, with
//! a short description and an example each. Plain help and bad invocations
//! both render it, bad invocations just append what went wrong.

use crate::config::{CommandSet, Config};

/// Single subcommand listing.
struct Entry {
    usage: &'static str,
    about: &'static str,
    example: &'static str,
}

/// Group of subcommand listings under one heading.
struct Section {
    heading: &'static str,
    only: Option<CommandSet>,
    entries: &'static [Entry],
}

const SECTIONS: &[Section] = &[
    Section {
        heading: "Setup commands",
        only: None,
        entries: &[
            Entry {
                usage: "init",
                about: "Create new empty dotfile repository",
                example: "init",
            },
            Entry {
                usage: "clone <url>",
                about: "Clone dotfiles, backing up files that would be overwritten",
                example: "clone https://example.org/dotfiles.git",
            },
            Entry {
                usage: "cancel",
                about: "Remove all tracked files and the dotfile repository",
                example: "cancel",
            },
        ],
    },
    Section {
        heading: "File commands",
        only: None,
        entries: &[
            Entry {
                usage: "add, track <path>...",
                about: "Start tracking files, even ignored ones",
                example: "track .bashrc .config/nvim",
            },
            Entry {
                usage: "untrack <path>...",
                about: "Stop tracking files, but keep them in home",
                example: "untrack .profile",
            },
            Entry {
                usage: "au, add-update [<path>...]",
                about: "Stage changes of already tracked files",
                example: "au",
            },
            Entry {
                usage: "mv <src> <dst>",
                about: "Move or rename tracked file",
                example: "mv .vimrc .config/vim/vimrc",
            },
            Entry {
                usage: "co, checkout [<path>...]",
                about: "Restore tracked files, all of them if no paths are given",
                example: "co .bashrc",
            },
            Entry {
                usage: "rm <path>...",
                about: "Stop tracking files, and delete them from home",
                example: "rm .inputrc",
            },
            Entry {
                usage: "ls",
                about: "List all tracked files",
                example: "ls",
            },
        ],
    },
    Section {
        heading: "Repository commands",
        only: None,
        entries: &[
            Entry {
                usage: "commit [<args>...]",
                about: "Record staged changes, opens editor without arguments",
                example: "commit -m \"update shell aliases\"",
            },
            Entry {
                usage: "push",
                about: "Push to configured remote and branch",
                example: "push",
            },
            Entry {
                usage: "status [<args>...]",
                about: "Show status without untracked files",
                example: "status -s",
            },
            Entry {
                usage: "diff [<args>...]",
                about: "Show changes",
                example: "diff --cached",
            },
            Entry {
                usage: "log [<args>...]",
                about: "Show commit history",
                example: "log --oneline",
            },
        ],
    },
    Section {
        heading: "Pull commands",
        only: Some(CommandSet::Modules),
        entries: &[Entry {
            usage: "pull",
            about: "Pull configured branch, then update all submodules",
            example: "pull",
        }],
    },
    Section {
        heading: "Pull commands",
        only: Some(CommandSet::Classic),
        entries: &[
            Entry {
                usage: "pull",
                about: "Pull configured branch, leave submodules alone",
                example: "pull",
            },
            Entry {
                usage: "pullx",
                about: "Pull configured branch with submodules, then update them",
                example: "pullx",
            },
            Entry {
                usage: "reinit",
                about: "Deinitialize all submodules, then initialize them again",
                example: "reinit",
            },
        ],
    },
    Section {
        heading: "Submodule commands",
        only: Some(CommandSet::Modules),
        entries: &[
            Entry {
                usage: "sm-ls",
                about: "List all submodules",
                example: "sm-ls",
            },
            Entry {
                usage: "sm-add <repo> <path>",
                about: "Add submodule at path inside home",
                example: "sm-add https://github.com/tmux-plugins/tpm .tmux/plugins/tpm",
            },
            Entry {
                usage: "sm-del <path>...",
                about: "Remove submodules, and delete their files",
                example: "sm-del .tmux/plugins/tpm",
            },
            Entry {
                usage: "sm-update [<path>...]",
                about: "Update submodules to their remote, all if no paths are given",
                example: "sm-update",
            },
            Entry {
                usage: "sm-reinit <path>...",
                about: "Deinitialize submodules, then initialize them again",
                example: "sm-reinit .tmux/plugins/tpm",
            },
        ],
    },
    Section {
        heading: "Other commands",
        only: None,
        entries: &[
            Entry {
                usage: "x <git-args>...",
                about: "Run any git command against the dotfile repository",
                example: "x stash list",
            },
            Entry {
                usage: "help",
                about: "Show this document",
                example: "help",
            },
        ],
    },
];

const USAGE_WIDTH: usize = 28;

/// Render usage document for active command set.
///
/// Appends `message` at the end if given.
pub fn render(config: &Config, message: Option<&str>) -> String {
    let program = config.program.as_str();
    let mut out = String::new();

    out.push_str(format!("usage: {program} <command> [<args>...]\n\n").as_str());
    out.push_str("Track dotfiles in your home directory through a bare git repository.\n");

    for section in SECTIONS {
        if section.only.is_some_and(|only| only != config.commands) {
            continue;
        }

        out.push_str(format!("\n{}:\n", section.heading).as_str());
        for entry in section.entries {
            out.push_str(format!("  {:<USAGE_WIDTH$}{}\n", entry.usage, entry.about).as_str());
            out.push_str(
                format!("  {:<USAGE_WIDTH$}e.g. {program} {}\n", "", entry.example).as_str(),
            );
        }
    }

    out.push_str("\nEnvironment:\n");
    for (name, about, value) in [
        ("WMDOT_REPO", "Dotfile repository", config.repository.display().to_string()),
        ("WMDOT_BACKUP", "Backup of overwritten files", config.backup.display().to_string()),
        ("WMDOT_COMMANDS", "Command set, modules or classic", config.commands.to_string()),
        ("WMDOT_CONFIG", "Settings file", "$XDG_CONFIG_HOME/wmdot/config.toml".into()),
    ] {
        out.push_str(format!("  {name:<USAGE_WIDTH$}{about} [{value}]\n").as_str());
    }

    if let Some(message) = message {
        out.push_str(format!("\n{message}\n").as_str());
    }

    out
}
