//! CLI commands: run the snippet pipeline over a documentation tree.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::Config;
use crate::diagnostics;
use crate::error::Error;
use crate::locator;
use crate::mkdocs::MkdocsConfigReader;
use crate::preview::{self, PreviewContext};
use crate::resolver::PathResolver;
use crate::scanner;
use crate::severity;
use crate::types::{DiagnosticRecord, MkdocsSnippetConfig, Severity, SnippetLink, SnippetLocation};

/// Output format for `check` and `links`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// `file:line:col: severity: message` lines.
    Text,
    /// A pretty-printed JSON array.
    Json,
}

/// Everything loaded once per run: settings, MkDocs flags, and the resolver.
pub struct Workspace {
    /// Project root every relative path is taken from.
    pub root: PathBuf,
    /// Settings from `.snippet-lens.toml`, or the defaults.
    pub config: Config,
    /// Snippet settings from `mkdocs.yml`, if one was found and parsed.
    pub mkdocs: Option<MkdocsSnippetConfig>,
    resolver: PathResolver,
}

impl Workspace {
    /// Load `.snippet-lens.toml` and `mkdocs.yml` from `root`.
    ///
    /// # Errors
    ///
    /// Returns errors from settings loading. MkDocs config problems are
    /// logged by the reader and never fail the load.
    pub fn load(root: &Path, reader: &MkdocsConfigReader) -> Result<Self, Error> {
        let config = Config::load(root)?;
        let mkdocs = reader.read(root);
        return Ok(Self {
            root: root.to_path_buf(),
            config,
            mkdocs,
            resolver: PathResolver::on_disk(),
        });
    }

    /// Severity for every diagnostic in this workspace.
    pub fn severity(&self) -> Severity {
        let check_paths = self.mkdocs.is_some_and(|m| m.check_paths);
        return severity::resolve_severity(Some(&self.config.strict_mode), check_paths);
    }

    fn context<'a>(&'a self, document_path: &'a Path) -> PreviewContext<'a> {
        return PreviewContext {
            document_path,
            workspace_root: &self.root,
            base_path: &self.config.base_path,
            max_lines: self.config.preview_max_lines,
            max_chars: self.config.preview_max_chars,
        };
    }

    /// Parse and locate all references in one document.
    pub fn locate(text: &str) -> Vec<SnippetLocation> {
        return locator::locate(text, &scanner::parse(text));
    }

    /// Diagnostics for the references already located in one document.
    pub fn diagnose(&self, document_path: &Path, locations: &[SnippetLocation]) -> Vec<DiagnosticRecord> {
        let context = self.context(document_path);
        return diagnostics::build_diagnostics(locations, |p| context.resolve(&self.resolver, p), self.severity());
    }
}

/// A diagnostic with its file position, as printed by `check`.
#[derive(Serialize)]
struct ReportedDiagnostic<'a> {
    file: String,
    line: usize,
    column: usize,
    #[serde(flatten)]
    record: &'a DiagnosticRecord,
}

/// Diagnose every scanned markdown file and print the results.
/// Exit code priority: error (2) > warning (1) > clean (0).
///
/// # Errors
///
/// Returns errors from settings loading or markdown reading.
pub fn check(root: &Path, format: Format, reader: &MkdocsConfigReader) -> Result<ExitCode, Error> {
    let workspace = Workspace::load(root, reader)?;
    let files = scanner::scan(root, &workspace.config)?;

    let mut per_file = Vec::new();
    let mut reference_count = 0;
    for file in &files {
        let locations = Workspace::locate(&file.content);
        reference_count += locations.len();
        let records = workspace.diagnose(&file.path, &locations);
        per_file.push((file, records));
    }

    let reported: Vec<ReportedDiagnostic<'_>> = per_file
        .iter()
        .flat_map(|(file, records)| {
            return records.iter().map(move |record| {
                let (line, column) = line_col(&file.content, record.start_offset);
                return ReportedDiagnostic {
                    file: file.relative.display().to_string(),
                    line,
                    column,
                    record,
                };
            });
        })
        .collect();

    match format {
        Format::Json => {
            // serde_json::to_string_pretty won't fail on this structure.
            println!("{}", serde_json::to_string_pretty(&reported).unwrap_or_default());
        },
        Format::Text => print_check_text(&reported, reference_count),
    }

    let worst = reported.iter().map(|d| d.record.severity).max();
    return Ok(match worst {
        Some(Severity::Error) => ExitCode::from(2),
        Some(Severity::Warning) => ExitCode::from(1),
        None => ExitCode::SUCCESS,
    });
}

fn print_check_text(reported: &[ReportedDiagnostic<'_>], reference_count: usize) {
    for d in reported {
        println!("{}:{}:{}: {}: {}", d.file, d.line, d.column, d.record.severity, d.record.message);
    }

    if reported.is_empty() {
        println!("All {reference_count} snippet references resolve");
        return;
    }

    let errors = reported.iter().filter(|d| d.record.severity == Severity::Error).count();
    let warnings = reported.len() - errors;
    println!();
    println!("{errors} errors, {warnings} warnings");
}

/// Print the inline preview for each reference in one markdown file.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file doesn't exist, or errors from
/// settings loading.
pub fn preview(root: &Path, file: &Path, reader: &MkdocsConfigReader) -> Result<ExitCode, Error> {
    let workspace = Workspace::load(root, reader)?;
    let (document_path, text) = read_document(root, file)?;
    let context = workspace.context(&document_path);

    for location in Workspace::locate(&text) {
        let (line, _) = line_col(&text, location.start_offset);
        let literal = location.reference.literal();
        match preview::create_preview(&location, &context, &workspace.resolver, |p| std::fs::read_to_string(p)) {
            Some(content) => println!("{}:{line}: {literal} -> {content}", file.display()),
            None => println!("{}:{line}: {literal} (unavailable)", file.display()),
        }
    }

    return Ok(ExitCode::SUCCESS);
}

/// Print the hover text for the reference at a 1-based line and column.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file doesn't exist, or errors from
/// settings loading.
pub fn hover(
    root: &Path,
    file: &Path,
    line: usize,
    column: usize,
    reader: &MkdocsConfigReader,
) -> Result<ExitCode, Error> {
    let workspace = Workspace::load(root, reader)?;
    let (document_path, text) = read_document(root, file)?;
    let context = workspace.context(&document_path);
    let locations = Workspace::locate(&text);

    let Some(offset) = offset_at(&text, line, column) else {
        eprintln!("{}:{line}:{column} is outside the file", file.display());
        return Ok(ExitCode::from(1));
    };

    return match preview::hover(&locations, offset, &context, &workspace.resolver, |p| std::fs::read_to_string(p)) {
        Some(hover_text) => {
            println!("{hover_text}");
            Ok(ExitCode::SUCCESS)
        },
        None => {
            eprintln!("no readable snippet reference at {}:{line}:{column}", file.display());
            Ok(ExitCode::from(1))
        },
    };
}

#[derive(Serialize)]
struct ReportedLink {
    line: usize,
    column: usize,
    #[serde(flatten)]
    link: SnippetLink,
}

/// Print where each resolvable reference in one markdown file points.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file doesn't exist, or errors from
/// settings loading.
pub fn links(root: &Path, file: &Path, format: Format, reader: &MkdocsConfigReader) -> Result<ExitCode, Error> {
    let workspace = Workspace::load(root, reader)?;
    let (document_path, text) = read_document(root, file)?;
    let context = workspace.context(&document_path);

    let locations = Workspace::locate(&text);
    let links: Vec<ReportedLink> = preview::create_links(&locations, |p| context.resolve(&workspace.resolver, p))
        .into_iter()
        .map(|link| {
            let (line, column) = line_col(&text, link.start_offset);
            return ReportedLink { line, column, link };
        })
        .collect();

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&links).unwrap_or_default()),
        Format::Text => {
            for l in &links {
                println!("{}:{}:{}: {} -> {}", file.display(), l.line, l.column, l.link.path, l.link.resolved_path.display());
            }
        },
    }

    return Ok(ExitCode::SUCCESS);
}

/// Read a markdown file given relative to `root` (or absolute).
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file doesn't exist, `Error::Io` otherwise.
fn read_document(root: &Path, file: &Path) -> Result<(PathBuf, String), Error> {
    let path = root.join(file);
    return match std::fs::read_to_string(&path) {
        Ok(text) => Ok((path, text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::FileNotFound { path }),
        Err(e) => Err(Error::Io(e)),
    };
}

/// One-based line and column (in characters) of a byte offset.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before.get(line_start..).map_or(0, |s| s.chars().count()) + 1;
    return (line, column);
}

/// Byte offset of a one-based line and column (in characters).
pub fn offset_at(text: &str, line: usize, column: usize) -> Option<usize> {
    let line_start = if line <= 1 {
        0
    } else {
        text.match_indices('\n').nth(line - 2).map(|(i, _)| i + 1)?
    };
    let rest = text.get(line_start..)?;
    let line_text = rest.split('\n').next().unwrap_or("");
    let column_offset = match line_text.char_indices().nth(column.saturating_sub(1)) {
        Some((i, _)) => i,
        None if column.saturating_sub(1) == line_text.chars().count() => line_text.len(),
        None => return None,
    };
    return Some(line_start + column_offset);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_from_one() {
        let text = "first\n--8<-- \"é.txt\"\n";
        assert_eq!(line_col(text, 0), (1, 1));
        assert_eq!(line_col(text, 6), (2, 1));
        let path_start = text.find('é').unwrap();
        assert_eq!(line_col(text, path_start), (2, 9));
        assert_eq!(line_col(text, path_start + 'é'.len_utf8()), (2, 10));
    }

    #[test]
    fn offset_at_inverts_line_col() {
        let text = "first\n--8<-- \"é.txt\"\nlast";
        for offset in [0, 3, 6, 14, 16, 22, text.len()] {
            let (line, column) = line_col(text, offset);
            assert_eq!(offset_at(text, line, column), Some(offset), "offset {offset}");
        }
        assert_eq!(offset_at(text, 9, 1), None);
        assert_eq!(offset_at(text, 1, 50), None);
    }

    #[test]
    fn workspace_diagnoses_with_mkdocs_severity() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("snippet.txt"), "hello").unwrap();
        std::fs::write(
            dir.path().join("mkdocs.yml"),
            "markdown_extensions:\n  - pymdownx.snippets:\n      check_paths: true\n",
        )
        .unwrap();

        let workspace = Workspace::load(dir.path(), &MkdocsConfigReader::default()).unwrap();
        assert_eq!(workspace.severity(), Severity::Error);

        let text = "--8<-- \"snippet.txt\"\n--8<-- \"missing.txt:1:2,x\"\n";
        let locations = Workspace::locate(text);
        assert_eq!(locations.len(), 2);
        let records = workspace.diagnose(&dir.path().join("docs/guide.md"), &locations);
        let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            ["Multi-range pattern contains non-numeric part: \"x\"", "Snippet file not found: 'missing.txt'"]
        );
        assert!(records.iter().all(|r| r.severity == Severity::Error));
    }

    #[test]
    fn strict_mode_overrides_mkdocs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("mkdocs.yml"),
            "markdown_extensions:\n  - pymdownx.snippets:\n      check_paths: true\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(".snippet-lens.toml"), "strict_mode = \"false\"\n").unwrap();

        let workspace = Workspace::load(dir.path(), &MkdocsConfigReader::default()).unwrap();
        assert_eq!(workspace.severity(), Severity::Warning);
    }

    #[test]
    fn missing_document_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_document(dir.path(), Path::new("nope.md"));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }
}
