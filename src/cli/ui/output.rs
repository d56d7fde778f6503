//! Styled terminal output for command summaries

use console::{Term, style};

/// User-facing messages; diagnostics go through `tracing` instead
pub struct Output {
    term: Term,
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn emit(&self, line: String) {
        // A closed stdout is not worth failing the run over
        let _ = self.term.write_line(&line);
    }

    pub fn success(&self, message: &str) {
        self.emit(format!("{} {}", style("✓").green(), message));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(format!("{} {}", style("⚠").yellow(), message));
    }

    pub fn info(&self, message: &str) {
        self.emit(format!("{} {}", style("ℹ").blue(), message));
    }

    pub fn header(&self, message: &str) {
        self.emit(String::new());
        self.emit(style(message).bold().underlined().to_string());
    }

    pub fn section(&self, message: &str) {
        self.emit(String::new());
        self.emit(style(message).bold().to_string());
        self.emit("─".repeat(40));
    }

    /// Aligned `label: value` line inside a section
    pub fn detail(&self, label: &str, value: impl std::fmt::Display) {
        self.emit(format!("  {:<12} {}", format!("{}:", label), value));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
