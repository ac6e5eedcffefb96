use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::types::{LineRange, Selector, SnippetReference};

/// `--8<--`, whitespace, then a quoted path with an optional selector.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"--8<--\s+(?:"([^"']+)"|'([^"']+)')"#).expect("valid regex");
});

static RANGE_PART: LazyLock<Regex> = LazyLock::new(|| return Regex::new(r"^(\d+):(\d+)$").expect("valid regex"));

static SINGLE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^(.*?):(\d+):(\d+)$").expect("valid regex"));

static NAMED_SECTION: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^(.*?):([^:/]+)$").expect("valid regex"));

/// Outcome of one classifier over the quoted reference text.
enum Attempt {
    /// The classifier recognised the text.
    Matched(SnippetReference),
    /// Try the next classifier.
    NoMatch,
}

/// Classifiers in priority order. Numeric selectors only differ from section
/// names by content, so the most specific shape is tried first.
const CLASSIFIERS: [fn(&str) -> Attempt; 3] = [classify_multi_range, classify_single_range, classify_named_section];

/// A markdown file found under the scan root.
pub struct MarkdownFile {
    /// Absolute or root-joined path used for reading and resolution.
    pub path: PathBuf,
    /// Path relative to the scan root, for display.
    pub relative: PathBuf,
    /// Full file text.
    pub content: String,
}

/// Detect every snippet reference in `text`, in document order.
///
/// # Panics
///
/// Panics if a hardcoded detection regex is invalid (compile-time invariant).
pub fn parse(text: &str) -> Vec<SnippetReference> {
    return DIRECTIVE
        .captures_iter(text)
        .filter_map(|cap| return cap.get(1).or_else(|| cap.get(2)))
        .map(|raw| return classify(raw.as_str()))
        .collect();
}

/// Run the classifiers in order, falling back to a bare path.
fn classify(raw: &str) -> SnippetReference {
    for classifier in CLASSIFIERS {
        if let Attempt::Matched(reference) = classifier(raw) {
            return reference;
        }
    }
    return SnippetReference::bare(raw);
}

/// `path:1:3,5:7`. A comma-bearing selector that fails validation is kept as
/// an ambiguous section rather than silently misread.
fn classify_multi_range(raw: &str) -> Attempt {
    let Some((path, trailing)) = raw.split_once(':') else {
        return Attempt::NoMatch;
    };
    if trailing.is_empty() || !trailing.contains(',') {
        return Attempt::NoMatch;
    }

    let mut ranges = Vec::new();
    for part in trailing.split(',') {
        let Some(range) = parse_range_part(part) else {
            return Attempt::Matched(SnippetReference {
                path: path.to_string(),
                selector: Selector::AmbiguousSection {
                    section: trailing.to_string(),
                    reason: describe_malformed_part(part),
                },
            });
        };
        ranges.push(range);
    }

    return Attempt::Matched(SnippetReference {
        path: path.to_string(),
        selector: Selector::MultiRange(ranges),
    });
}

/// `path:10:20`.
fn classify_single_range(raw: &str) -> Attempt {
    let Some(cap) = SINGLE_RANGE.captures(raw) else {
        return Attempt::NoMatch;
    };
    let (Ok(start), Ok(end)) = (cap[2].parse::<usize>(), cap[3].parse::<usize>()) else {
        return Attempt::NoMatch;
    };
    return Attempt::Matched(SnippetReference {
        path: cap[1].to_string(),
        selector: Selector::Lines(LineRange::new(start, end)),
    });
}

/// `path:name` where the name has no `:` or `/`.
fn classify_named_section(raw: &str) -> Attempt {
    let Some(cap) = NAMED_SECTION.captures(raw) else {
        return Attempt::NoMatch;
    };
    return Attempt::Matched(SnippetReference {
        path: cap[1].to_string(),
        selector: Selector::Section(cap[2].to_string()),
    });
}

fn parse_range_part(part: &str) -> Option<LineRange> {
    let cap = RANGE_PART.captures(part)?;
    let start = cap[1].parse().ok()?;
    let end = cap[2].parse().ok()?;
    return Some(LineRange::new(start, end));
}

/// A part that looks numeric is probably a mistyped range; anything else is
/// probably a section name that happens to contain a comma.
fn describe_malformed_part(part: &str) -> String {
    if part.is_empty() || part.chars().any(|c| c.is_ascii_digit()) {
        return format!("Multi-range pattern contains malformed range: \"{part}\"");
    }
    return format!("Multi-range pattern contains non-numeric part: \"{part}\"");
}

/// Collect all markdown files under `root`, applying the config's
/// include/exclude filters.
///
/// # Errors
///
/// Returns `Error::Io` if any markdown file cannot be read.
pub fn scan(root: &Path, config: &Config) -> Result<Vec<MarkdownFile>, Error> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md" || ext == "markdown"))
    {
        let md_path = entry.path();
        let relative = md_path.strip_prefix(root).unwrap_or(md_path).to_path_buf();

        if !config.should_scan(&relative.to_string_lossy()) {
            continue;
        }

        let content = std::fs::read_to_string(md_path)?;
        tracing::debug!(file = %relative.display(), "scanned markdown file");
        files.push(MarkdownFile {
            path: md_path.to_path_buf(),
            relative,
            content,
        });
    }

    return Ok(files);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn single(text: &str) -> SnippetReference {
        let mut refs = parse(text);
        assert_eq!(refs.len(), 1, "expected one reference in {text:?}");
        return refs.remove(0);
    }

    #[test]
    fn double_and_single_quotes() {
        assert_eq!(single(r#"--8<-- "path/to/file.txt""#), SnippetReference::bare("path/to/file.txt"));
        assert_eq!(single("--8<-- 'path/to/file.txt'"), SnippetReference::bare("path/to/file.txt"));
    }

    #[test]
    fn extra_whitespace_after_marker() {
        assert_eq!(single(r#"--8<--   "file.txt""#).path, "file.txt");
    }

    #[test]
    fn no_references() {
        assert!(parse("This is just regular markdown text").is_empty());
    }

    #[test]
    fn mismatched_quotes_are_not_references() {
        assert!(parse(r#"--8<-- "file.txt'"#).is_empty());
    }

    #[test]
    fn multiple_references_keep_document_order() {
        let refs = parse("--8<-- \"file1.txt\"\nSome text\n--8<-- \"file2.txt\"");
        let paths: Vec<&str> = refs.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["file1.txt", "file2.txt"]);
    }

    #[test]
    fn named_section() {
        let r = single(r#"--8<-- "file.md:my_section""#);
        assert_eq!(r.path, "file.md");
        assert_eq!(r.selector, Selector::Section("my_section".to_string()));
    }

    #[test]
    fn single_line_range() {
        let r = single(r#"--8<-- "file.md:10:20""#);
        assert_eq!(r.path, "file.md");
        assert_eq!(r.selector, Selector::Lines(LineRange::new(10, 20)));
        assert!(!r.selector.is_ambiguous());
    }

    #[test]
    fn inverted_line_range_is_kept_as_written() {
        let r = single(r#"--8<-- "file.md:9:2""#);
        assert_eq!(r.selector, Selector::Lines(LineRange::new(9, 2)));
    }

    #[test]
    fn multiple_line_ranges() {
        let r = single(r#"--8<-- "file.md:1:3,5:7,2:2""#);
        assert_eq!(r.path, "file.md");
        assert_eq!(
            r.selector,
            Selector::MultiRange(vec![LineRange::new(1, 3), LineRange::new(5, 7), LineRange::new(2, 2)])
        );
    }

    #[test]
    fn malformed_multi_range_with_word_is_ambiguous() {
        let r = single(r#"--8<-- "file.md:1:3,invalid""#);
        assert_eq!(r.path, "file.md");
        assert_eq!(r.selector.section(), Some("1:3,invalid"));
        assert!(r.selector.is_ambiguous());
        assert_eq!(
            r.selector.ambiguous_reason(),
            Some(r#"Multi-range pattern contains non-numeric part: "invalid""#)
        );
    }

    #[test]
    fn malformed_multi_range_with_digits_is_malformed_range() {
        let r = single(r#"--8<-- "file.md:1:3,5-7""#);
        assert_eq!(
            r.selector.ambiguous_reason(),
            Some(r#"Multi-range pattern contains malformed range: "5-7""#)
        );
    }

    #[test]
    fn empty_multi_range_part_is_malformed_range() {
        let r = single(r#"--8<-- "file.md:1:3,,5:7""#);
        assert_eq!(r.selector.section(), Some("1:3,,5:7"));
        assert_eq!(
            r.selector.ambiguous_reason(),
            Some(r#"Multi-range pattern contains malformed range: """#)
        );
    }

    #[test]
    fn first_offending_part_is_reported() {
        let r = single(r#"--8<-- "a.md:x,1:2,9""#);
        assert_eq!(r.selector.ambiguous_reason(), Some(r#"Multi-range pattern contains non-numeric part: "x""#));
    }

    #[test]
    fn path_with_directories_is_not_a_section() {
        let r = single(r#"--8<-- "docs/snippets/file.md""#);
        assert_eq!(r.selector, Selector::None);
    }

    #[test]
    fn path_with_colon_and_slash_stays_bare() {
        assert_eq!(single(r#"--8<-- "C:/docs/file.md""#), SnippetReference::bare("C:/docs/file.md"));
    }

    #[test]
    fn oversized_line_numbers_fall_back_to_section() {
        let r = single(r#"--8<-- "f.md:1:99999999999999999999999""#);
        assert_eq!(r.path, "f.md:1");
        assert_eq!(r.selector, Selector::Section("99999999999999999999999".to_string()));
    }

    #[test]
    fn literal_reproduces_quoted_text() {
        for text in ["a.md", "a.md:sec", "a.md:1:2", "a.md:1:2,4:5", "a.md:1:3,nope"] {
            let r = single(&format!("--8<-- \"{text}\""));
            assert_eq!(r.literal(), text);
        }
    }

    #[test]
    fn parsing_is_restartable() {
        let text = "--8<-- \"a.md:s\"\n--8<-- 'b.md'";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn scan_applies_include_and_exclude() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs/archive")).unwrap();
        std::fs::write(dir.path().join("docs/guide.md"), "--8<-- \"a.txt\"").unwrap();
        std::fs::write(dir.path().join("docs/archive/old.md"), "old").unwrap();
        std::fs::write(dir.path().join("README.md"), "readme").unwrap();
        std::fs::write(
            dir.path().join(".snippet-lens.toml"),
            "include = [\"docs/\"]\nexclude = [\"docs/archive/\"]\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        let files = scan(dir.path(), &config).unwrap();
        let relative: Vec<PathBuf> = files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(relative, [PathBuf::from("docs/guide.md")]);
    }
}
