//! Span-anchored rendering of reader errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use rill_reader::{ReadError, ReadErrorKind};

/// Render a reader error against its source file.
pub fn render_read_error(path: &str, source: &str, err: &ReadError) {
    let title = match err.kind {
        ReadErrorKind::Syntax => "syntax error",
        ReadErrorKind::Unbalanced => "unbalanced input",
    };
    let span = err.span.as_range();

    let report = Report::build(ReportKind::Error, path, span.start)
        .with_message(title)
        .with_label(
            Label::new((path, span))
                .with_message(&err.message)
                .with_color(Color::Red),
        )
        .finish();

    // Rendering failures (e.g. a closed stderr) are not worth surfacing.
    let _ = report.eprint((path, Source::from(source)));
}
