//! Colored progress and result reporting on stderr.

use console::{Style, Term};
use dts_build::BuildReport;

/// Terminal reporter for conversion runs.
pub(crate) struct Output {
    term: Term,
    label: Style,
    ok: Style,
    warn: Style,
    fail: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Print a `label: value` line.
    pub(crate) fn field(&self, label: &str, value: impl std::fmt::Display) {
        self.line(&format!("{} {value}", self.label.apply_to(format!("{label}:"))));
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.warn.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.fail.apply_to(msg).to_string());
    }

    /// Print warnings, navigation failures and counts of a finished run.
    pub(crate) fn report(&self, report: &BuildReport) {
        for warning in &report.warnings {
            self.warning(&format!("Warning: {warning}"));
        }
        for failure in &report.navigation_failures {
            self.error(&format!("Failed: {failure}"));
        }
        self.field("Fragments", report.fragments);
        self.field("Cite depth", report.cite_depth);
        self.field("Navigation documents", report.navigation_documents);
    }
}
