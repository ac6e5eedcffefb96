/// Crate-level error types for the snippet-lens host layer.
///
/// The core pipeline (parse, locate, resolve, extract) never fails; these
/// errors only come from reading settings, arguments, and setting up watches.
use std::path::PathBuf;

/// Every variant names the file or reason so the CLI can render a useful
/// diagnostic without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported from the library root")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A markdown file named on the command line does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// `.snippet-lens.toml` exists but is not valid.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be created or attached.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
