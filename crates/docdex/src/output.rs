//! Build progress and error reporting on the terminal.
//!
//! Everything here goes to stderr so that lookup results on stdout stay
//! pipeable. Message text is built by plain functions and styled on write.

use std::path::Path;

use console::{Style, Term};
use docdex_catalog::{MatchReport, WalkReport};

/// Terminal reporter for catalog builds.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Report the documentation tree being walked.
    pub(crate) fn source(&self, tree: &Path) {
        self.plain(&format!("Source: {}", tree.display()));
    }

    /// Report navigation walk counts, warning when documents were lost.
    pub(crate) fn walk_report(&self, report: &WalkReport) {
        let line = walk_summary(report);
        if walk_lost_documents(report) {
            self.styled(&self.yellow, &line);
        } else {
            self.plain(&line);
        }
    }

    /// Report symbol matching counts, warning when symbols went unmatched.
    pub(crate) fn match_report(&self, report: &MatchReport) {
        let line = match_summary(report);
        if report.unmatched > 0 || report.path_collisions > 0 {
            self.styled(&self.yellow, &line);
        } else {
            self.plain(&line);
        }
    }

    /// Report that the symbol list could not be used.
    pub(crate) fn symbols_skipped(&self, reason: &dyn std::fmt::Display) {
        self.styled(&self.yellow, &format!("Skipping symbol matching: {reason}"));
    }

    /// Report where a kept clone lives.
    pub(crate) fn kept_clone(&self, path: &Path) {
        self.styled(&self.cyan_bold, &format!("Kept clone at {}", path.display()));
    }

    /// Report the finished catalog.
    pub(crate) fn built(&self, documents: usize, database: &Path) {
        self.styled(&self.green, &built_summary(documents, database));
    }

    /// Report a fatal error.
    pub(crate) fn error(&self, err: &dyn std::fmt::Display) {
        self.styled(&self.red, &format!("Error: {err}"));
    }

    fn plain(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}

fn walk_lost_documents(report: &WalkReport) -> bool {
    report.unreadable > 0 || report.failed_includes > 0 || report.cyclic_includes > 0
}

fn walk_summary(report: &WalkReport) -> String {
    format!(
        "Catalog: {} documents ({} ignored, {} unreadable, {} failed includes, {} cyclic includes, {} duplicates)",
        report.documents,
        report.ignored,
        report.unreadable,
        report.failed_includes,
        report.cyclic_includes,
        report.duplicates
    )
}

fn match_summary(report: &MatchReport) -> String {
    let mut line = format!(
        "Symbols: {} parsed, {} matched, {} unmatched, {} duplicates, {} disambiguation pages recovered",
        report.parsed, report.matched, report.unmatched, report.duplicate_symbols, report.recovered
    );
    if report.path_collisions > 0 {
        line.push_str(&format!(
            ", {} dropped on path collision",
            report.path_collisions
        ));
    }
    line
}

fn built_summary(documents: usize, database: &Path) -> String {
    format!(
        "Catalog of {documents} documents written to {}",
        database.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn match_report(path_collisions: usize) -> MatchReport {
        MatchReport {
            parsed: 5,
            recovered: 1,
            matched: 2,
            unmatched: 2,
            duplicate_symbols: 1,
            path_collisions,
        }
    }

    #[test]
    fn test_walk_summary() {
        let report = WalkReport {
            documents: 12,
            ignored: 1,
            failed_includes: 1,
            ..WalkReport::default()
        };
        assert_eq!(
            walk_summary(&report),
            "Catalog: 12 documents (1 ignored, 0 unreadable, 1 failed includes, 0 cyclic includes, 0 duplicates)"
        );
        assert!(walk_lost_documents(&report));
    }

    #[test]
    fn test_walk_ignored_and_duplicates_are_not_losses() {
        let report = WalkReport {
            documents: 3,
            ignored: 2,
            duplicates: 1,
            ..WalkReport::default()
        };
        assert!(!walk_lost_documents(&report));
    }

    #[test]
    fn test_match_summary() {
        assert_eq!(
            match_summary(&match_report(0)),
            "Symbols: 5 parsed, 2 matched, 2 unmatched, 1 duplicates, 1 disambiguation pages recovered"
        );
    }

    #[test]
    fn test_match_summary_with_path_collisions() {
        assert_eq!(
            match_summary(&match_report(3)),
            "Symbols: 5 parsed, 2 matched, 2 unmatched, 1 duplicates, 1 disambiguation pages recovered, 3 dropped on path collision"
        );
    }

    #[test]
    fn test_built_summary() {
        assert_eq!(
            built_summary(40, Path::new("out/docs.db")),
            "Catalog of 40 documents written to out/docs.db"
        );
    }
}
