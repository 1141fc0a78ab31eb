//! Error adapter for converting SwimlaneError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Input errors carry
//! the decoded TOML source, so they are rendered with a labeled snippet.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use swimlane::SwimlaneError;

/// Adapter implementing [`MietteDiagnostic`] for a [`SwimlaneError`].
pub struct ErrorAdapter<'a>(pub &'a SwimlaneError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            // The snippet label carries the location, keep the headline short.
            SwimlaneError::Input { err, .. } => write!(f, "Invalid process model: {}", err.message()),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            SwimlaneError::Io(_) => "swimlane::io",
            SwimlaneError::Input { .. } => "swimlane::input",
            SwimlaneError::MalformedGraph { .. } => "swimlane::malformed_graph",
            SwimlaneError::Layout(_) => "swimlane::layout",
            SwimlaneError::Export(_) => "swimlane::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            SwimlaneError::MalformedGraph { .. } => Some(Box::new(
                "check that every referenced pool, lane, node and host is declared exactly once",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match &self.0 {
            SwimlaneError::Input { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let SwimlaneError::Input { err, .. } = &self.0 else {
            return None;
        };
        let span = err.span()?;
        let span = SourceSpan::new(span.start.into(), span.len());
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some("here".to_string()), span),
        )))
    }
}

#[cfg(test)]
mod tests {
    use swimlane::DiagramBuilder;

    use super::*;

    fn input_error(source: &str) -> SwimlaneError {
        DiagramBuilder::default()
            .parse(source)
            .expect_err("source should be rejected")
    }

    #[test]
    fn test_input_error_has_source_and_label() {
        let err = input_error("[[node]]\nid = \"a\"\nkind = \"rocket\"\n");
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "swimlane::input");
        assert!(adapter.source_code().is_some());

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].label(), Some("here"));
    }

    #[test]
    fn test_input_error_renders_snippet() {
        let err = input_error("[[node]]\nid = \"a\"\nkind = \"rocket\"\n");
        let mut writer = String::new();

        miette::GraphicalReportHandler::new()
            .render_report(&mut writer, &ErrorAdapter(&err))
            .unwrap();

        assert!(writer.contains("rocket"));
        assert!(writer.contains("swimlane::input"));
    }

    #[test]
    fn test_non_input_error() {
        let err = SwimlaneError::Layout("layout error".to_string());
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.to_string(), "Layout error: layout error");
        assert_eq!(adapter.code().unwrap().to_string(), "swimlane::layout");
        assert!(adapter.source_code().is_none());
        assert!(adapter.labels().is_none());
    }

    #[test]
    fn test_malformed_graph_has_help() {
        let err = SwimlaneError::MalformedGraph {
            id: "f1".into(),
            reason: "unknown target".to_string(),
        };
        let adapter = ErrorAdapter(&err);

        assert_eq!(
            adapter.code().unwrap().to_string(),
            "swimlane::malformed_graph"
        );
        assert!(adapter.help().is_some());
    }
}
