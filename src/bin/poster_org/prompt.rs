//! User confirmation capabilities.
//!
//! Ambiguous matches and destructive steps are resolved through an injected
//! [`Confirmer`] so the planning rules never depend on the UI: the console
//! implementation blocks on stdin, tests inject scripted doubles.

use std::io::Write;

use colored::Colorize;

/// Outcome of a match confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Use the matched title.
    Accept,
    /// Organize under the raw source name instead of the match.
    Force,
    /// Leave the item untouched.
    Decline,
}

/// Decision source for fuzzy matches and yes/no questions.
pub trait Confirmer {
    /// Resolve a fuzzy match of `item` against `candidate` with the given score.
    fn confirm_match(&mut self, item: &str, candidate: &str, score: u8) -> Decision;

    /// Plain yes/no question.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Interactive confirmer that prompts on stdin.
pub struct ConsoleConfirmer;

impl Confirmer for ConsoleConfirmer {
    fn confirm_match(&mut self, item: &str, candidate: &str, score: u8) -> Decision {
        print!(
            "{}",
            format!("Matched {item} to {candidate} [score: {score}], proceed? (y/n/f): ").magenta()
        );
        if std::io::stdout().flush().is_err() {
            return Decision::Decline;
        }

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() {
            return Decision::Decline;
        }
        match input.trim().to_lowercase().as_str() {
            // Enter defaults to accepting the match
            "y" | "yes" | "" => Decision::Accept,
            "f" => Decision::Force,
            _ => Decision::Decline,
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        print!("{}", format!("{message} (y/n): ").magenta());
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        input.trim().eq_ignore_ascii_case("y")
    }
}
