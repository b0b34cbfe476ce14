//! Error type shared by the document store, the generator, and the toolchain wrappers.
//!
//! Test execution outcomes are *not* errors: once `xcodebuild test-without-building` has been spawned the result is
//! a [`xctestrun_core::RunnerExitCode`]. Everything here aborts the current operation.

use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while reading, patching, or generating an xctestrun document.
#[derive(Debug, Error, Diagnostic)]
pub enum XctestrunError {
    /// Unsupported SDK/test type combination or missing input, detected before touching the filesystem.
    #[error("illegal argument: {0}")]
    #[diagnostic(code(xctestrun::illegal_argument))]
    IllegalArgument(String),

    /// A field path does not resolve in the document.
    #[error("field `{field}` does not exist in {}", path.display())]
    #[diagnostic(
        code(xctestrun::field_not_found),
        help("field paths are colon-separated keys below the document's root key, e.g. `TestingEnvironmentVariables:DYLD_LIBRARY_PATH`")
    )]
    FieldNotFound { field: String, path: PathBuf },

    /// The document does not have exactly one root key.
    #[error("invalid xctestrun document {}: {reason}", path.display())]
    #[diagnostic(code(xctestrun::invalid_document))]
    InvalidDocument { path: PathBuf, reason: String },

    /// The harness build produced zero or several candidates for an expected artifact.
    #[error("xctestrun generation failed: {0}")]
    #[diagnostic(code(xctestrun::generation))]
    Generation(String),

    /// `xcodebuild build-for-testing` on the harness project exited unsuccessfully.
    #[error("harness build failed with status {status}:\n{output_tail}")]
    #[diagnostic(code(xctestrun::build), help("re-run with RUST_LOG=debug to see the full xcodebuild command"))]
    Build { status: String, output_tail: String },

    /// Toolchain path discovery failed.
    #[error("toolchain lookup failed: {0}")]
    #[diagnostic(code(xctestrun::toolchain), help("check that Xcode is installed and `xcode-select -p` points at it"))]
    Toolchain(String),

    /// A bundle could not be patched. Callers treat this as non-fatal.
    #[error("bundle {} could not be updated: {reason}", path.display())]
    #[diagnostic(code(xctestrun::bundle))]
    Bundle { path: PathBuf, reason: String },

    /// Reading or writing a plist failed.
    #[error("plist error in {}: {source}", path.display())]
    #[diagnostic(code(xctestrun::plist))]
    Plist {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },

    /// Reading options files failed.
    #[error("invalid options file {}: {source}", path.display())]
    #[diagnostic(code(xctestrun::options))]
    Options {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(xctestrun::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, XctestrunError>;

impl XctestrunError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        XctestrunError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a plist error with the path it concerns.
    pub fn plist(path: impl AsRef<Path>, source: plist::Error) -> Self {
        XctestrunError::Plist {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this is a lookup failure on a document field.
    pub fn is_field_not_found(&self) -> bool {
        matches!(self, XctestrunError::FieldNotFound { .. })
    }
}

/// Extension for attaching a path to `io::Result`s.
pub(crate) trait IoResultExt<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| XctestrunError::io(path, e))
    }
}
