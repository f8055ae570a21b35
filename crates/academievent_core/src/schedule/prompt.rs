//! Synchronous user confirmation capability.

use std::io::{BufRead, Write};

/// Blocking yes/no question to the acting user.
///
/// The resolver suspends on `ask`; no other schedule mutation by the same
/// actor may interleave before it returns.
pub trait ConfirmationPrompt {
    fn ask(&mut self, message: &str) -> bool;
}

/// Prompt that answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmationPrompt for FixedAnswer {
    fn ask(&mut self, _message: &str) -> bool {
        self.0
    }
}

/// Line-based prompt over any reader/writer pair (terminal front ends).
///
/// Accepts `y`/`yes` case-insensitively; anything else, EOF included, is a
/// decline.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmationPrompt for LinePrompt<R, W> {
    fn ask(&mut self, message: &str) -> bool {
        if write!(self.output, "{message} [y/N] ").is_err() || self.output.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_prompt_accepts_yes_variants_only() {
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new("YES\n".as_bytes(), &mut output);
        assert!(prompt.ask("Move it?"));

        let mut prompt = LinePrompt::new("nope\n".as_bytes(), Vec::new());
        assert!(!prompt.ask("Move it?"));

        let mut prompt = LinePrompt::new("".as_bytes(), Vec::new());
        assert!(!prompt.ask("Move it?"));
    }

    #[test]
    fn line_prompt_writes_question() {
        let mut output = Vec::new();
        LinePrompt::new("y\n".as_bytes(), &mut output).ask("Move it?");
        assert_eq!(String::from_utf8(output).unwrap(), "Move it? [y/N] ");
    }
}
