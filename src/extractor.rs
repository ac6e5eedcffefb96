//! Content selection and compact single-line formatting for previews.

use regex::Regex;

use crate::types::{LineRange, Selector};

/// Visual stand-in for a newline in single-line previews.
const NEWLINE_TOKEN: &str = " ⏎ ";

/// Apply a selector to a file's content.
///
/// Sections that cannot be found degrade to the whole content. Line ranges
/// are clamped to the file; an inverted range selects nothing.
pub fn extract(content: &str, selector: &Selector) -> String {
    return match selector {
        Selector::None => content.to_string(),
        Selector::Section(name)
        | Selector::AmbiguousSection {
            section: name, ..
        } => extract_section(content, name).unwrap_or_else(|| content.to_string()),
        Selector::Lines(range) => {
            let lines: Vec<&str> = content.split('\n').collect();
            slice_lines(&lines, *range).join("\n")
        },
        Selector::MultiRange(ranges) => {
            let lines: Vec<&str> = content.split('\n').collect();
            ranges.iter().flat_map(|range| slice_lines(&lines, *range)).copied().collect::<Vec<_>>().join("\n")
        },
    };
}

/// Lines strictly between the first start marker for `name` and the next end
/// marker for `name`. `None` when no such pair exists.
fn extract_section(content: &str, name: &str) -> Option<String> {
    let start = section_marker("start", name)?;
    let end = section_marker("end", name)?;

    let lines: Vec<&str> = content.split('\n').collect();
    let first = lines.iter().position(|line| start.is_match(line))?;
    let inner = lines.get(first + 1..)?;
    let len = inner.iter().position(|line| end.is_match(line))?;

    return Some(inner.get(..len)?.join("\n"));
}

/// Matches `--8<-- [start:name]` anywhere in a line, tolerating whitespace
/// inside the brackets and any surrounding comment syntax.
fn section_marker(kind: &str, name: &str) -> Option<Regex> {
    let name = regex::escape(name);
    let pattern = format!(r"--8<--\s*\[\s*{kind}\s*:\s*{name}\s*\]");
    return match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(section = %name, error = %e, "could not build section marker pattern");
            None
        },
    };
}

/// One-based inclusive slice, clamped to the available lines.
fn slice_lines<'a, 'b>(lines: &'b [&'a str], range: LineRange) -> &'b [&'a str] {
    let from = range.start.saturating_sub(1).min(lines.len());
    let to = range.end.min(lines.len());
    return lines.get(from..to).unwrap_or_default();
}

/// Collapse content onto one line for inline display.
///
/// Newlines become ` ⏎ `. With `max_lines`, extra lines are replaced by a
/// `... (n more lines)` suffix. With `max_chars`, the result is cut to that
/// many characters and `...` is appended, which may cut into the suffix.
/// Zero limits are ignored.
pub fn format_for_display(content: &str, max_lines: Option<usize>, max_chars: Option<usize>) -> String {
    if content.is_empty() {
        return String::new();
    }

    let mut visible = content.to_string();
    let mut hidden = 0;
    if let Some(max) = max_lines.filter(|&m| m > 0) {
        let lines: Vec<&str> = content.split('\n').collect();
        if lines.len() > max {
            hidden = lines.len() - max;
            visible = lines.get(..max).unwrap_or_default().join("\n");
        }
    }

    let mut result = visible.replace('\n', NEWLINE_TOKEN);
    if hidden > 0 {
        result.push_str(&format!("{NEWLINE_TOKEN}... ({hidden} more {})", plural_lines(hidden)));
    }

    if let Some(max) = max_chars.filter(|&m| m > 0)
        && result.chars().count() > max
    {
        result = result.chars().take(max).collect();
        result.push_str("...");
    }

    return result;
}

/// Raw content for a hover popup, truncated to `max_lines` with a
/// `... (n more lines)` trailer. Newlines are kept.
pub fn hover_text(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    if max_lines == 0 || lines.len() <= max_lines {
        return content.to_string();
    }

    let hidden = lines.len() - max_lines;
    let shown = lines.get(..max_lines).unwrap_or_default().join("\n");
    return format!("{shown}\n... ({hidden} more {})", plural_lines(hidden));
}

const fn plural_lines(count: usize) -> &'static str {
    return if count == 1 { "line" } else { "lines" };
}
