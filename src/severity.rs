//! Diagnostic severity from the user's strict-mode override and MkDocs' `check_paths`.

use crate::types::Severity;

/// The `strict_mode` setting. Unknown strings degrade to `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrictMode {
    /// Follow `check_paths` from `mkdocs.yml`.
    #[default]
    Auto,
    /// Always report errors.
    Always,
    /// Always report warnings.
    Never,
}

impl StrictMode {
    /// `"true"` and `"false"` force a mode; anything else, or no value, is `Auto`.
    pub fn from_setting(setting: Option<&str>) -> Self {
        return match setting {
            Some("true") => StrictMode::Always,
            Some("false") => StrictMode::Never,
            _ => StrictMode::Auto,
        };
    }

    /// Severity under this mode, given the MkDocs `check_paths` flag.
    pub const fn severity(self, check_paths: bool) -> Severity {
        return match self {
            StrictMode::Always => Severity::Error,
            StrictMode::Never => Severity::Warning,
            StrictMode::Auto if check_paths => Severity::Error,
            StrictMode::Auto => Severity::Warning,
        };
    }
}

/// `"true"` → error, `"false"` → warning, anything else follows `check_paths`.
pub fn resolve_severity(strict_mode: Option<&str>, check_paths: bool) -> Severity {
    return StrictMode::from_setting(strict_mode).severity(check_paths);
}
