//! Layered path resolution for snippet references.

use std::path::{Component, Path, PathBuf};

/// Turns a reference's raw path into a file path using an ordered fallback
/// chain. The existence check is injected so resolution can be tested
/// without touching the filesystem.
pub struct PathResolver<F = fn(&Path) -> bool> {
    exists: F,
}

impl PathResolver {
    /// Resolver backed by the real filesystem.
    pub fn on_disk() -> Self {
        return Self {
            exists: Path::exists,
        };
    }
}

impl<F: Fn(&Path) -> bool> PathResolver<F> {
    /// Resolver that asks `exists` whether a candidate path is present.
    pub const fn new(exists: F) -> Self {
        return Self { exists };
    }

    /// Resolve `raw` against, in order: itself if absolute (unchecked), the
    /// containing file's directory, the workspace root, and `base_path`.
    ///
    /// A relative `base_path` is taken relative to the workspace root.
    pub fn resolve(&self, raw: &str, containing_file: &Path, workspace_root: &Path, base_path: &str) -> Option<PathBuf> {
        let raw_path = Path::new(raw);
        if raw_path.is_absolute() {
            return Some(raw_path.to_path_buf());
        }

        let containing_dir = containing_file.parent().unwrap_or_else(|| Path::new(""));
        let mut candidates = vec![containing_dir.join(raw_path), workspace_root.join(raw_path)];
        if !base_path.is_empty() {
            candidates.push(workspace_root.join(base_path).join(raw_path));
        }

        let found = candidates.into_iter().map(|c| normalize_path(&c)).find(|c| (self.exists)(c));
        if found.is_none() {
            tracing::debug!(path = raw, from = %containing_file.display(), "snippet path did not resolve");
        }
        return found;
    }
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => {
            match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                },
                // `/..` is still `/`.
                Some(Component::RootDir | Component::Prefix(_)) => {},
                Some(Component::ParentDir | Component::CurDir) | None => components.push(component),
            }
        },
        other => components.push(other),
    }
}
