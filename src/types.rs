/// Core domain types for snippet references, locations, and diagnostics.
use std::fmt;
use std::path::PathBuf;

/// One detected `--8<-- "path[:selector]"` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetReference {
    /// Target path exactly as written in the document.
    pub path: String,
    /// What part of the target file the reference selects.
    pub selector: Selector,
}

impl SnippetReference {
    /// Reference to a whole file.
    pub fn bare(path: impl Into<String>) -> Self {
        return Self {
            path: path.into(),
            selector: Selector::None,
        };
    }

    /// The literal text between the quotes that produced this reference.
    pub fn literal(&self) -> String {
        return match &self.selector {
            Selector::None => self.path.clone(),
            Selector::Section(name)
            | Selector::AmbiguousSection {
                section: name, ..
            } => format!("{}:{name}", self.path),
            Selector::Lines(range) => format!("{}:{range}", self.path),
            Selector::MultiRange(ranges) => {
                let joined = ranges.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
                format!("{}:{joined}", self.path)
            },
        };
    }
}

/// The part of a reference after the first colon. Exactly one kind applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Whole file.
    None,
    /// Named section delimited by `--8<-- [start:name]` / `--8<-- [end:name]`.
    Section(String),
    /// Single inclusive line range.
    Lines(LineRange),
    /// Several line ranges, concatenated in order. Never empty.
    MultiRange(Vec<LineRange>),
    /// A malformed multi-range kept as a section name and flagged for the user.
    AmbiguousSection {
        /// The whole trailing text after the first colon.
        section: String,
        /// Human-readable description of the offending part.
        reason: String,
    },
}

impl Selector {
    /// Section name for both plain and ambiguous section selectors.
    pub fn section(&self) -> Option<&str> {
        return match self {
            Selector::Section(name)
            | Selector::AmbiguousSection {
                section: name, ..
            } => Some(name),
            Selector::None | Selector::Lines(_) | Selector::MultiRange(_) => None,
        };
    }

    /// Why this selector was flagged, if it was.
    pub fn ambiguous_reason(&self) -> Option<&str> {
        return match self {
            Selector::AmbiguousSection { reason, .. } => Some(reason),
            Selector::None | Selector::Section(_) | Selector::Lines(_) | Selector::MultiRange(_) => None,
        };
    }

    /// True for a malformed multi-range kept as a section.
    pub fn is_ambiguous(&self) -> bool {
        return matches!(self, Selector::AmbiguousSection { .. });
    }
}

/// One-based, inclusive line range. Ordering and bounds are not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    /// First line, one-based.
    pub start: usize,
    /// Last line, inclusive.
    pub end: usize,
}

impl LineRange {
    /// Range from `start` to `end`, both inclusive.
    pub const fn new(start: usize, end: usize) -> Self {
        return Self { start, end };
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.start, self.end);
    }
}

/// A reference paired with the byte offsets of its occurrence in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetLocation {
    /// The parsed reference found at this position.
    pub reference: SnippetReference,
    /// Start of the raw path text (just inside the opening quote).
    pub start_offset: usize,
    /// End of the raw path text, before any `:selector`.
    pub end_offset: usize,
    /// Just past the closing quote.
    pub line_end_offset: usize,
}

/// User-facing criticality. `Error` sorts above `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Shown as a warning; `check` exits 1.
    Warning,
    /// Shown as an error; `check` exits 2.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        };
    }
}

/// A problem found with one located reference.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DiagnosticRecord {
    /// Text shown to the user.
    pub message: String,
    /// Byte offset where the reference's path starts.
    pub start_offset: usize,
    /// Byte offset where the reference's path ends.
    pub end_offset: usize,
    /// Severity for the whole run.
    pub severity: Severity,
}

/// Snippet settings read from `mkdocs.yml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MkdocsSnippetConfig {
    /// `markdown_extensions -> pymdownx.snippets -> check_paths`.
    pub check_paths: bool,
}

/// A clickable span pointing at a resolved snippet file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SnippetLink {
    /// Path as written in the document.
    pub path: String,
    /// Byte offset where the path starts.
    pub start_offset: usize,
    /// Byte offset where the path ends.
    pub end_offset: usize,
    /// Where the path resolved to.
    pub resolved_path: PathBuf,
}
