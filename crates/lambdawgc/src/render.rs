//! Ariadne-based diagnostic rendering.
//!
//! Renders the shared [`Diagnostic`] record into formatted, labeled
//! reports. Output is colorless so it is stable in tests and logs; the
//! code, message, labeled span, and hints are all carried through.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use lambdawg_common::diagnostic::{Diagnostic, Severity};

/// Render one diagnostic against its attached source.
///
/// Diagnostics that were not routed through the driver (no attached
/// source) fall back to a single-line rendering.
pub fn render_diagnostic(diag: &Diagnostic) -> String {
    let Some(source) = diag.source.as_deref() else {
        return format!("{diag}\n");
    };

    let config = Config::default().with_color(false);
    let source_len = source.len();

    // Clamp the span into the source and keep it non-empty so the label
    // points at something.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len).max(s)
        } else {
            s..e
        }
    };
    let span = clamp(diag.span.start as usize..diag.span.end as usize);

    let (kind, color) = match diag.severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
        Severity::Info => (ReportKind::Advice, Color::Blue),
    };

    let mut builder = Report::build(kind, span.clone())
        .with_code(diag.code)
        .with_message(&diag.message)
        .with_config(config);

    builder.add_label(
        Label::new(span)
            .with_message(&diag.message)
            .with_color(color),
    );

    if !diag.hints.is_empty() {
        builder.set_help(diag.hints.join("\n"));
    }

    let report = builder.finish();
    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}
