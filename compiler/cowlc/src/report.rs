//! Error rendering.

use std::fmt::Write;

use cowl_eval::EvalError;
use cowl_ir::Span;

/// Render `err` for a terminal.
///
/// ```text
/// error[ImmutableBindingError]: cannot mutate immutable binding `xs`
///  --> 2:1
///   |
/// 2 | xs.push(3)
///   | ^^^^^^^^^^
///   = note: ...
/// ```
///
/// Locations and the underlined source line are only printed when both a
/// span and the source text are available.
pub fn render_error(err: &EvalError, source: Option<&str>) -> String {
    let mut out = format!("error[{}]: {}", err.code(), err.message);
    let mut gutter = 1;
    if let (Some(span), Some(source)) = (err.span, source) {
        let (line, col) = span.line_col(source);
        gutter = line.to_string().len();
        let pad = " ".repeat(gutter);
        let _ = write!(out, "\n{pad}--> {line}:{col}");
        if let Some(text) = source.lines().nth(line - 1) {
            let carets = "^".repeat(underline_width(span, source));
            let indent = " ".repeat(col - 1);
            let _ = write!(out, "\n{pad} |\n{line} | {text}\n{pad} | {indent}{carets}");
        }
    }
    let pad = " ".repeat(gutter);
    for note in &err.notes {
        match (note.span, source) {
            (Some(span), Some(source)) => {
                let (line, col) = span.line_col(source);
                let _ = write!(out, "\n{pad} = note: {} (at {line}:{col})", note.message);
            }
            _ => {
                let _ = write!(out, "\n{pad} = note: {}", note.message);
            }
        }
    }
    out
}

/// Number of carets under `span`: its length in characters, cut at the end
/// of its first line, and at least one.
fn underline_width(span: Span, source: &str) -> usize {
    let start = (span.start as usize).min(source.len());
    let end = (span.end as usize).clamp(start, source.len());
    source
        .get(start..end)
        .map_or(0, |text| text.chars().take_while(|&c| c != '\n').count())
        .max(1)
}
