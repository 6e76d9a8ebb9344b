// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Track dotfiles of your home directory through a bare Git repository.
//!
//! Dotfiles live in a bare repository, by default `~/.local/var/wmdot`,
//! whose work tree is the home directory itself. Every Git call is bound to
//! that pair through `--git-dir` and `--work-tree`, so the home directory
//! never has to become a Git repository of its own.
//!
//! # See Also
//!
//! 1. [ArchWiki - dotfiles](https://wiki.archlinux.org/title/Dotfiles#Tracking_dotfiles_directly_with_Git)

pub mod config;
pub mod dotfiles;
pub mod git;
pub mod path;
pub mod prompt;
pub mod rewrite;
pub mod usage;
