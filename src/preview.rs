//! Assembles what a host shows for each located reference: inline previews,
//! hover text, and links. File access goes through injected callbacks.

use std::io;
use std::path::{Path, PathBuf};

use crate::extractor;
use crate::resolver::PathResolver;
use crate::types::{SnippetLink, SnippetLocation};

/// Where a document lives and how previews are bounded.
#[derive(Debug, Clone)]
pub struct PreviewContext<'a> {
    /// The markdown file containing the references.
    pub document_path: &'a Path,
    /// Project root, the second resolution candidate.
    pub workspace_root: &'a Path,
    /// Extra directory tried last; empty to skip it.
    pub base_path: &'a str,
    /// Line limit for previews and hovers.
    pub max_lines: usize,
    /// Character limit for inline previews.
    pub max_chars: usize,
}

impl PreviewContext<'_> {
    /// Resolve a reference path the way every host feature does.
    pub fn resolve<F: Fn(&Path) -> bool>(&self, resolver: &PathResolver<F>, raw: &str) -> Option<PathBuf> {
        return resolver.resolve(raw, self.document_path, self.workspace_root, self.base_path);
    }
}

/// Single-line preview of the selected content, or `None` if the path does
/// not resolve or the file cannot be read.
pub fn create_preview<F, R>(
    location: &SnippetLocation,
    context: &PreviewContext<'_>,
    resolver: &PathResolver<F>,
    read_file: R,
) -> Option<String>
where
    F: Fn(&Path) -> bool,
    R: Fn(&Path) -> io::Result<String>,
{
    let resolved = context.resolve(resolver, &location.reference.path)?;
    let content = read_readable(&resolved, read_file)?;
    let selected = extractor::extract(&content, &location.reference.selector);
    return Some(extractor::format_for_display(
        &selected,
        Some(context.max_lines),
        Some(context.max_chars),
    ));
}

/// Hover text for the reference under `offset`: the whole target file,
/// truncated to the context's line limit.
pub fn hover<F, R>(
    locations: &[SnippetLocation],
    offset: usize,
    context: &PreviewContext<'_>,
    resolver: &PathResolver<F>,
    read_file: R,
) -> Option<String>
where
    F: Fn(&Path) -> bool,
    R: Fn(&Path) -> io::Result<String>,
{
    let location = locations.iter().find(|l| (l.start_offset..=l.line_end_offset).contains(&offset))?;
    let resolved = context.resolve(resolver, &location.reference.path)?;
    let content = read_readable(&resolved, read_file)?;
    return Some(extractor::hover_text(&content, context.max_lines));
}

/// Links for every location whose path resolves. Unresolved ones are left
/// to diagnostics.
pub fn create_links<R, P>(locations: &[SnippetLocation], resolve_path: R) -> Vec<SnippetLink>
where
    R: Fn(&str) -> Option<P>,
    P: Into<PathBuf>,
{
    return locations
        .iter()
        .filter_map(|location| {
            let resolved_path = resolve_path(&location.reference.path)?.into();
            return Some(SnippetLink {
                path: location.reference.path.clone(),
                start_offset: location.start_offset,
                end_offset: location.end_offset,
                resolved_path,
            });
        })
        .collect();
}

/// Reading is best effort: the resolver already saw the file, so a failure
/// here is a race or a permissions problem and only costs the preview.
fn read_readable<R: Fn(&Path) -> io::Result<String>>(path: &Path, read_file: R) -> Option<String> {
    return match read_file(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "snippet file unreadable");
            None
        },
    };
}
