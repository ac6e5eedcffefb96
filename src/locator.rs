//! Maps parsed references back onto byte offsets in the document text.

use std::collections::HashSet;

use regex::Regex;

use crate::types::{SnippetLocation, SnippetReference};

/// Locate each reference's occurrence in `text`, preserving reference order.
///
/// Occurrences are claimed at most once, so the Nth of several identical
/// references maps to the Nth textual occurrence. References with no
/// unclaimed occurrence are dropped.
pub fn locate(text: &str, references: &[SnippetReference]) -> Vec<SnippetLocation> {
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut locations = Vec::with_capacity(references.len());

    for reference in references {
        let literal = reference.literal();
        let Some(pattern) = occurrence_pattern(&literal) else {
            continue;
        };

        let Some(occurrence) = pattern.find_iter(text).find(|m| !claimed.contains(&m.start())) else {
            tracing::trace!(literal = %literal, "no unclaimed occurrence");
            continue;
        };
        claimed.insert(occurrence.start());

        // The match ends with `<literal><quote>`, so the path starts one quote
        // plus the literal's length before the end.
        let start_offset = occurrence.end() - 1 - literal.len();
        locations.push(SnippetLocation {
            reference: reference.clone(),
            start_offset,
            end_offset: start_offset + reference.path.len(),
            line_end_offset: occurrence.end(),
        });
    }

    return locations;
}

/// `--8<--`, whitespace, then the literal in double or single quotes.
fn occurrence_pattern(literal: &str) -> Option<Regex> {
    let escaped = regex::escape(literal);
    return match Regex::new(&format!(r#"--8<--\s+(?:"{escaped}"|'{escaped}')"#)) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            tracing::warn!(literal = %literal, error = %e, "could not build occurrence pattern");
            None
        },
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::scanner::parse;
    use crate::types::{LineRange, Selector};

    fn span(text: &str, location: &SnippetLocation) -> String {
        return text[location.start_offset..location.end_offset].to_string();
    }

    #[test]
    fn double_quotes_span_path_only() {
        let text = r#"--8<-- "path/to/file.txt""#;
        let locations = locate(text, &parse(text));
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].start_offset, 8);
        assert_eq!(locations[0].end_offset, 24);
        assert_eq!(locations[0].line_end_offset, text.len());
        assert_eq!(span(text, &locations[0]), "path/to/file.txt");
    }

    #[test]
    fn single_quotes() {
        let text = "--8<-- 'path/to/file.txt'";
        let locations = locate(text, &parse(text));
        assert_eq!(locations[0].start_offset, 8);
        assert_eq!(span(text, &locations[0]), "path/to/file.txt");
    }

    #[test]
    fn selector_is_excluded_from_span() {
        let text = "intro\n--8<-- \"file.md:10:20\" trailing";
        let locations = locate(text, &parse(text));
        assert_eq!(span(text, &locations[0]), "file.md");
        assert_eq!(&text[..locations[0].line_end_offset], "intro\n--8<-- \"file.md:10:20\"");
    }

    #[test]
    fn every_selector_kind_is_found() {
        let text = "--8<-- \"a.md:sec\"\n--8<-- \"b.md:1:2\"\n--8<-- \"c.md:1:2,4:5\"\n--8<-- \"d.md:1:2,x\"";
        let locations = locate(text, &parse(text));
        let spans: Vec<String> = locations.iter().map(|l| span(text, l)).collect();
        assert_eq!(spans, ["a.md", "b.md", "c.md", "d.md"]);
    }

    #[test]
    fn extra_whitespace_after_marker() {
        let text = "--8<--    \"file.txt\"";
        let locations = locate(text, &parse(text));
        assert_eq!(span(text, &locations[0]), "file.txt");
    }

    #[test]
    fn duplicate_references_claim_distinct_occurrences() {
        let text = "--8<-- \"file.txt\"\nSome text\n--8<-- \"file.txt\"\n--8<-- 'file.txt'";
        let locations = locate(text, &parse(text));
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0].start_offset, 8);
        assert_eq!(locations[0].end_offset, 16);
        for pair in locations.windows(2) {
            assert!(pair[0].line_end_offset <= pair[1].start_offset);
        }
        for location in &locations {
            assert_eq!(span(text, location), "file.txt");
        }
    }

    #[test]
    fn prefix_paths_do_not_steal_occurrences() {
        let text = "--8<-- \"file.txt.bak\"\n--8<-- \"file.txt\"";
        let locations = locate(text, &parse(text));
        assert_eq!(locations.len(), 2);
        assert_eq!(span(text, &locations[1]), "file.txt");
        assert!(locations[1].start_offset > locations[0].start_offset);
    }

    #[test]
    fn missing_occurrence_is_dropped() {
        let references = vec![SnippetReference::bare("file.txt")];
        assert!(locate("No snippets here", &references).is_empty());
    }

    #[test]
    fn more_references_than_occurrences() {
        let text = "--8<-- \"file.txt\"";
        let references = vec![SnippetReference::bare("file.txt"), SnippetReference::bare("file.txt")];
        assert_eq!(locate(text, &references).len(), 1);
    }

    #[test]
    fn regex_metacharacters_in_paths() {
        let text = "--8<-- \"snippets/(v1)+[draft].md:1:2\"";
        let locations = locate(text, &parse(text));
        assert_eq!(locations[0].reference.selector, Selector::Lines(LineRange::new(1, 2)));
        assert_eq!(span(text, &locations[0]), "snippets/(v1)+[draft].md");
    }

    #[test]
    fn empty_reference_list() {
        assert!(locate("--8<-- \"file.txt\"", &[]).is_empty());
    }
}
