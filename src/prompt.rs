// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! User confirmation.
//!
//! Destructive or first-time operations ask the user before doing anything.
//! The [`Confirm`] trait is the seam that lets operations be driven by
//! scripted answers instead of a real terminal.

use inquire::{InquireError, Text};
use std::io::{stdin, BufRead, IsTerminal};
use tracing::debug;

/// Ask the user a yes or no question.
pub trait Confirm {
    /// Ask until the answer is unambiguous.
    ///
    /// Returns `true` on yes, and `false` on no.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

impl<C> Confirm for &mut C
where
    C: Confirm + ?Sized,
{
    fn confirm(&mut self, question: &str) -> Result<bool> {
        (**self).confirm(question)
    }
}

/// Interpret a single line of input as an answer.
///
/// Anything starting with "y" or "Y" means yes. Anything starting with "n" or
/// "N" means no, and so does a blank line. Everything else is ambiguous, so
/// `None` is returned.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().chars().next() {
        None => Some(false),
        Some('y' | 'Y') => Some(true),
        Some('n' | 'N') => Some(false),
        Some(_) => None,
    }
}

/// Confirm through the user's terminal.
///
/// Prompts through [`inquire`] when standard input is a terminal. Otherwise
/// reads plain lines from standard input, so answers can be piped in.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl TerminalConfirm {
    /// Construct new terminal confirmer.
    pub fn new() -> Self {
        Self
    }

    fn read_answer(&self, question: &str) -> Result<Option<String>> {
        if stdin().is_terminal() {
            return match Text::new(question).with_help_message("[y/N]").prompt() {
                Ok(answer) => Ok(Some(answer)),
                Err(InquireError::OperationCanceled) => Ok(None),
                Err(err) => Err(PromptError::Inquire(err)),
            };
        }

        eprint!("{question} [y/N] ");
        let mut line = String::new();
        if stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line))
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            // INVARIANT: Closed input or escape counts as a no.
            let Some(answer) = self.read_answer(question)? else {
                return Ok(false);
            };

            match parse_answer(&answer) {
                Some(yes) => return Ok(yes),
                None => debug!("ambiguous answer {answer:?}, asking again"),
            }
        }
    }
}

/// Confirmation error types.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Terminal prompt failed or was interrupted.
    #[error(transparent)]
    Inquire(#[from] InquireError),

    /// Answer could not be read from standard input.
    #[error("failed to read answer from standard input")]
    Stdin(#[from] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = PromptError> = std::result::Result<T, E>;
