use crate::error::Error;
use crate::types::{DiagnosticRecord, Severity, SnippetLocation};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Build diagnostics for located references.
///
/// Each location can produce an ambiguity record and, independently, a
/// not-found record when `resolve_path` yields nothing. Both use the
/// location's path offsets and the given severity.
pub fn build_diagnostics<R, P>(locations: &[SnippetLocation], resolve_path: R, severity: Severity) -> Vec<DiagnosticRecord>
where
    R: Fn(&str) -> Option<P>,
{
    let mut diagnostics = Vec::new();

    for location in locations {
        let reference = &location.reference;

        if let Some(reason) = reference.selector.ambiguous_reason() {
            diagnostics.push(DiagnosticRecord {
                message: reason.to_string(),
                start_offset: location.start_offset,
                end_offset: location.end_offset,
                severity,
            });
        }

        if resolve_path(&reference.path).is_none() {
            diagnostics.push(DiagnosticRecord {
                message: format!("Snippet file not found: '{}'", reference.path),
                start_offset: location.start_offset,
                end_offset: location.end_offset,
                severity,
            });
        }
    }

    return diagnostics;
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown block: what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!(
            "\
# Error: File Not Found

`{}` does not exist.
",
            path.display()
        ),
        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),
        Error::TomlDe(e) => format!(
            "\
# Error: Invalid Settings

`.snippet-lens.toml` could not be parsed:

{e}

## Fix

Correct the file or delete it to use the defaults.
"
        ),
        Error::WatchFailed { reason } => format!(
            "\
# Error: Watch Failed

{reason}
"
        ),
    };
}
