//! Reads the snippet-related settings out of `mkdocs.yml`.

use std::path::Path;
use std::sync::Arc;

use serde_yaml::Value;

use crate::types::MkdocsSnippetConfig;

/// Config files tried in order.
const CONFIG_FILES: [&str; 2] = ["mkdocs.yml", "mkdocs.yaml"];

const SNIPPETS_EXTENSION: &str = "pymdownx.snippets";

/// Sink for best-effort diagnostics from the config reader.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Forwards messages to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Loads `MkdocsSnippetConfig` from a project root, reporting parse
/// failures through the logger it was built with.
#[derive(Clone)]
pub struct MkdocsConfigReader {
    logger: Arc<dyn Logger>,
}

impl Default for MkdocsConfigReader {
    fn default() -> Self {
        return Self::new(Arc::new(TracingLogger));
    }
}

impl MkdocsConfigReader {
    /// Reader that reports parse failures to `logger`.
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        return Self { logger };
    }

    /// Read `mkdocs.yml`, falling back to `mkdocs.yaml`.
    ///
    /// Returns `None` when neither exists, or when the first one found cannot
    /// be read or parsed (logged once). A parsed file without the snippets
    /// extension or without `check_paths` yields `check_paths: false`.
    pub fn read(&self, root: &Path) -> Option<MkdocsSnippetConfig> {
        for file_name in CONFIG_FILES {
            let path = root.join(file_name);
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    self.report_failure(file_name, &e);
                    return None;
                },
            };

            return match serde_yaml::from_str::<Value>(&content) {
                Ok(doc) => {
                    let check_paths = extract_check_paths(&doc);
                    tracing::debug!(file = file_name, check_paths, "loaded mkdocs config");
                    Some(MkdocsSnippetConfig { check_paths })
                },
                Err(e) => {
                    self.report_failure(file_name, &e);
                    None
                },
            };
        }

        return None;
    }

    fn report_failure(&self, file_name: &str, error: &dyn std::fmt::Display) {
        self.logger.log(&format!(
            "[MkDocs Config] Failed to parse {file_name}: {error}. Falling back to default (warnings)."
        ));
    }
}

/// `markdown_extensions -> pymdownx.snippets -> check_paths`, defaulting to false.
///
/// The extension appears either as a bare string or as a single-key mapping
/// holding its options.
fn extract_check_paths(doc: &Value) -> bool {
    let Some(extensions) = doc.get("markdown_extensions").and_then(Value::as_sequence) else {
        return false;
    };

    for extension in extensions {
        match extension {
            Value::String(name) if name == SNIPPETS_EXTENSION => return false,
            Value::Mapping(mapping) => {
                let Some((name, options)) = mapping.iter().next() else {
                    continue;
                };
                if name.as_str() != Some(SNIPPETS_EXTENSION) {
                    continue;
                }
                return options.get("check_paths").and_then(Value::as_bool).unwrap_or(false);
            },
            _ => {},
        }
    }

    return false;
}
