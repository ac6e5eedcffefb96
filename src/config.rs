use std::path::Path;

use crate::error::Error;
use crate::severity::StrictMode;

/// Name of the settings file looked up in the project root.
pub const SETTINGS_FILE: &str = ".snippet-lens.toml";

const DEFAULT_PREVIEW_MAX_LINES: usize = 20;
const DEFAULT_PREVIEW_MAX_CHARS: usize = 200;

/// Project settings loaded from `.snippet-lens.toml`.
/// Include/exclude patterns are path prefixes applied to markdown source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Extra directory tried last when resolving snippet paths.
    pub base_path: String,
    /// Raw `strict_mode` value: `"auto"`, `"true"`, or `"false"`.
    pub strict_mode: String,
    /// Lines shown in an inline preview before the `... (n more lines)` suffix.
    pub preview_max_lines: usize,
    /// Characters shown in an inline preview before truncation.
    pub preview_max_chars: usize,
    include: Vec<String>,
    exclude: Vec<String>,
}

/// Raw TOML structure for `.snippet-lens.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SnippetLensTomlConfig {
    #[serde(default)]
    base_path: String,
    #[serde(default = "default_strict_mode")]
    strict_mode: String,
    #[serde(default = "default_preview_max_lines")]
    preview_max_lines: usize,
    #[serde(default = "default_preview_max_chars")]
    preview_max_chars: usize,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

fn default_strict_mode() -> String {
    return "auto".to_string();
}

const fn default_preview_max_lines() -> usize {
    return DEFAULT_PREVIEW_MAX_LINES;
}

const fn default_preview_max_chars() -> usize {
    return DEFAULT_PREVIEW_MAX_CHARS;
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            base_path: String::new(),
            strict_mode: default_strict_mode(),
            preview_max_lines: DEFAULT_PREVIEW_MAX_LINES,
            preview_max_chars: DEFAULT_PREVIEW_MAX_CHARS,
            include: Vec::new(),
            exclude: Vec::new(),
        };
    }
}

impl Config {
    /// Load settings from `.snippet-lens.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// A file that exists but is malformed is an error, not a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(SETTINGS_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no {SETTINGS_FILE}, using defaults");
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        return Self::parse(&content);
    }

    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: SnippetLensTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            base_path: raw.base_path,
            strict_mode: raw.strict_mode,
            preview_max_lines: raw.preview_max_lines,
            preview_max_chars: raw.preview_max_chars,
            include: raw.include,
            exclude: raw.exclude,
        });
    }

    /// The `strict_mode` setting, with unknown values read as `auto`.
    pub fn strict_mode(&self) -> StrictMode {
        return StrictMode::from_setting(Some(&self.strict_mode));
    }

    /// Check whether a markdown file path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|p| relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| relative_path.starts_with(p.as_str()));
    }
}
