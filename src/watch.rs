//! File watcher: runs `check` on startup, then re-runs on changes to
//! markdown, snippet files, or either config file.

use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};
use parking_lot::Mutex;

use crate::coalescer::ExecutionCoalescer;
use crate::commands::{self, Format};
use crate::diagnostics;
use crate::error::Error;
use crate::mkdocs::MkdocsConfigReader;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Directories whose churn never affects snippet references.
const IGNORED_DIRS: [&str; 3] = [".git", "target", "site"];

/// True unless every path in the event sits under an ignored directory.
/// Only components below `root` are checked, so the root's own ancestors
/// never count.
fn is_relevant(paths: &[PathBuf], root: &Path) -> bool {
    return paths.is_empty() || paths.iter().any(|p| !in_ignored_dir(p.strip_prefix(root).unwrap_or(p)));
}

fn in_ignored_dir(path: &Path) -> bool {
    return path.components().any(|c| match c {
        Component::Normal(name) => IGNORED_DIRS.iter().any(|d| name == *d),
        _ => false,
    });
}

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(tx: crossbeam_channel::Sender<()>, root: PathBuf) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
            )
            && is_relevant(&event.paths, &root)
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchFailed {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches the root recursively. Each debounced
/// change starts a reload on its own thread; reloads go through an
/// `ExecutionCoalescer` so bursts collapse into at most one follow-up run.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created or attached.
pub fn run(root: &Path, format: Format) -> Result<ExitCode, Error> {
    let reader = MkdocsConfigReader::default();

    eprintln!("watch: initial check");
    let last_code = Arc::new(Mutex::new(run_check(root, format, &reader)));
    let coalescer = Arc::new(ExecutionCoalescer::new());

    let (tx, rx) = crossbeam_channel::unbounded();
    // Event paths are absolute, so filter against the canonical root.
    let watch_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut watcher = create_watcher(tx, watch_root)?;
    watcher.watch(root, RecursiveMode::Recursive).map_err(|e| {
        return Error::WatchFailed {
            reason: format!("cannot watch {}: {e}", root.display()),
        };
    })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", root.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        tracing::debug!("change detected");

        let coalescer = Arc::clone(&coalescer);
        let last_code = Arc::clone(&last_code);
        let reader = reader.clone();
        let root = root.to_path_buf();
        std::thread::spawn(move || {
            let result = coalescer.execute(|| -> Result<(), Error> {
                eprintln!("watch: change detected, re-checking...");
                let code = commands::check(&root, format, &reader)?;
                *last_code.lock() = code;
                return Ok(());
            });
            if let Err(e) = result {
                diagnostics::print_error(&e);
                *last_code.lock() = ExitCode::from(3);
            }
        });
    }

    let code = *last_code.lock();
    return Ok(code);
}

/// Run check once and print result. Returns the exit code from check.
fn run_check(root: &Path, format: Format, reader: &MkdocsConfigReader) -> ExitCode {
    return match commands::check(root, format, reader) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn relevant(root: &str, paths: &[&str]) -> bool {
        let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        return is_relevant(&paths, Path::new(root));
    }

    #[test]
    fn build_output_is_ignored() {
        assert!(!relevant("/project", &["/project/target/debug/x"]));
        assert!(!relevant("/project", &["/project/.git/index", "/project/site/index.html"]));
    }

    #[test]
    fn docs_and_config_are_relevant() {
        assert!(relevant("/project", &["/project/docs/guide.md"]));
        assert!(relevant("/project", &["/project/mkdocs.yml"]));
        assert!(relevant("/project", &["/project/.git/index", "/project/snippets/a.txt"]));
        assert!(relevant("/project", &[]));
    }

    #[test]
    fn ignored_names_match_whole_components() {
        assert!(relevant("/project", &["/project/targets/a.md"]));
        assert!(relevant("/project", &["/project/website/a.md"]));
    }

    #[test]
    fn root_under_an_ignored_name_still_sees_edits() {
        assert!(relevant("/home/me/site/my-docs", &["/home/me/site/my-docs/docs/guide.md"]));
        assert!(relevant("/srv/target/docs", &["/srv/target/docs/mkdocs.yml"]));
        assert!(!relevant("/home/me/site/my-docs", &["/home/me/site/my-docs/site/index.html"]));
    }

    #[test]
    fn paths_outside_root_are_checked_whole() {
        assert!(!relevant("/project", &["/elsewhere/target/x"]));
        assert!(relevant("/project", &["/elsewhere/docs/x.md"]));
    }
}
