//! Colored terminal output on stderr.

use std::fmt::Display;

use console::{Term, style};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, text: impl Display) {
        let _ = self.term.write_line(&text.to_string());
    }

    /// Plain message.
    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    /// Yellow message.
    pub(crate) fn warning(&self, msg: &str) {
        self.line(style(msg).yellow());
    }

    /// Red message.
    pub(crate) fn error(&self, msg: &str) {
        self.line(style(msg).red());
    }

    /// Cyan bold message, used for the startup banner.
    pub(crate) fn highlight(&self, msg: &str) {
        self.line(style(msg).cyan().bold());
    }
}
