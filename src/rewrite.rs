// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Subcommand rewriting.
//!
//! Most subcommands are short names for Git commands with some fixed flags.
//! Rewriting maps a subcommand and its arguments into a __plan__: an ordered
//! list of Git argument vectors that still need to be bound to the dotfile
//! repository through [`expand_bin_args`](crate::git::expand_bin_args).
//!
//! Rewriting never touches the file system or runs anything, so the same
//! subcommand and arguments always yield the same plan.

use crate::{
    config::{CommandSet, Config},
    git::from_top,
};

use std::ffi::OsString;

/// Ordered Git argument vectors to run one after another.
pub type Plan = Vec<Vec<OsString>>;

/// Rewrite subcommand into plan of Git calls.
///
/// Returns `None` if the subcommand is not known to the active command set.
pub fn rewrite(config: &Config, name: &str, args: Vec<OsString>) -> Option<Plan> {
    let remote = config.remote.as_str();
    let branch = config.branch.as_str();

    let plan = match (config.commands, name) {
        (_, "add" | "track") => vec![prefixed(["add", "-f"], args)],
        (_, "untrack") => vec![prefixed(["rm", "--cached"], args)],
        (_, "au" | "add-update") => vec![prefixed(["add", "-u"], args)],
        (_, "mv") => vec![prefixed(["mv", "-k"], args)],
        (_, "co" | "checkout") if args.is_empty() => {
            vec![prefixed(["checkout", "--", ":/"], args)]
        }
        (_, "co" | "checkout") => vec![prefixed(["checkout", "--"], args)],
        (_, "rm") => vec![prefixed(["rm"], args)],
        (_, "commit") => vec![prefixed(["commit"], args)],
        (_, "push") => vec![prefixed(["push", remote, branch], args)],
        (_, "status") => vec![prefixed(["status", "--untracked-files=no"], args)],
        (_, "diff") => vec![prefixed(["diff"], args)],
        (_, "log") => vec![prefixed(["log"], args)],
        (_, "ls") => vec![prefixed(["ls-tree", "-r", "--name-only", "--full-tree", "HEAD"], args)],
        (_, "x") => vec![args],
        (CommandSet::Modules, "pull") => vec![
            prefixed(["pull", "--no-recurse-submodules", remote, branch], args),
            update_submodules(config),
        ],
        (CommandSet::Classic, "pull") => {
            vec![prefixed(["pull", "--no-recurse-submodules", remote, branch], args)]
        }
        (CommandSet::Classic, "pullx") => vec![
            prefixed(["pull", "--recurse-submodules", remote, branch], args),
            update_submodules(config),
        ],
        (CommandSet::Classic, "reinit") => vec![
            from_top(config, ["submodule", "deinit", "--all", "--force"]),
            update_submodules(config),
        ],
        _ => return None,
    };

    Some(plan)
}

/// Recursively initialize and update every submodule.
pub fn update_submodules(config: &Config) -> Vec<OsString> {
    from_top(config, ["submodule", "update", "--init", "--recursive"])
}

fn prefixed<'a>(head: impl IntoIterator<Item = &'a str>, args: Vec<OsString>) -> Vec<OsString> {
    let mut bin_args = head.into_iter().map(OsString::from).collect::<Vec<_>>();
    bin_args.extend(args);
    bin_args
}
