//! Domain-specific error types for the rendering pipeline.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ParseError`],
//! [`ExecutionError`]) while the command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ShellgenError
//! ├── Parse(ParseError)           — malformed document, unknown field, document count
//! ├── Validation(ValidationError) — invalid command kinds, joined per file
//! ├── Resolution(ResolutionError) — value-file loading, key=value arguments
//! ├── Execution(ExecutionError)   — `run` command failure or timeout
//! └── Render(RenderError)         — template evaluation failure
//! ```
//!
//! Validation-style errors (invalid kinds, malformed arguments) collect every
//! problem in a file or argument list before failing, so a user sees them all
//! in one pass. Everything else aborts the current file immediately.

use thiserror::Error;

/// Top-level error type for the rendering pipeline.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum ShellgenError {
    /// Document parsing error (YAML decode, strict schema, document count).
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Command validation error (invalid kinds, reported jointly).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Variable resolution error (value-files, key=value arguments).
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// `run` command execution error (non-zero exit, launch failure, timeout).
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Template rendering error, passed through from the template engine.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Errors that arise while decoding documents.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The document is not valid YAML or contains an unknown field.
    #[error("parsing {file}: {source}")]
    InvalidDocument {
        /// Path of the file the document came from.
        file: String,
        /// Underlying decode error.
        source: serde_yaml::Error,
    },

    /// A file split into more documents than the header/body protocol allows.
    #[error("expected at most 2 documents in {file}, got {count}")]
    TooManyDocuments {
        /// Path of the offending file.
        file: String,
        /// Number of documents found.
        count: usize,
    },

    /// An I/O error occurred while reading an input file.
    #[error("reading {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Accumulated per-command validation problems for one file.
///
/// Carries every issue found so a single pass surfaces all of them.
#[derive(Error, Debug)]
pub struct ValidationError {
    /// One formatted message per invalid command.
    pub issues: Vec<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.issues.join("; "))
    }
}

/// Errors that arise while resolving the variable environment.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// A value-file could not be read.
    #[error("loading values file {path}: {source}")]
    ValuesFileIo {
        /// Path of the value-file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A value-file is not a flat key/value document.
    #[error("parsing values file {path}: {source}")]
    ValuesFileParse {
        /// Path of the value-file.
        path: String,
        /// Underlying decode error.
        source: serde_yaml::Error,
    },

    /// One or more `key=value` arguments were malformed.
    ///
    /// All malformed tokens are collected and reported together rather than
    /// failing at the first one.
    #[error("parsing args: {}", issues.join("; "))]
    MalformedArgs {
        /// One formatted message per malformed token.
        issues: Vec<String>,
    },
}

/// Errors that arise while executing a `run` command at export time.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The command exited with a non-zero status.
    #[error("executing command {name:?}: exit {code}: {stderr}")]
    CommandFailed {
        /// Name of the failing command.
        name: String,
        /// Exit code reported by the shell.
        code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The command did not finish within the configured timeout.
    #[error("executing command {name:?}: timed out after {seconds}s")]
    Timeout {
        /// Name of the failing command.
        name: String,
        /// Timeout that was exceeded, in seconds.
        seconds: u64,
    },

    /// The interpreter process could not be started.
    #[error("executing command {name:?}: {source}")]
    Launch {
        /// Name of the failing command.
        name: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },

    /// No active shell was provided to run the command under.
    #[error("active shell is required to execute command {name:?}")]
    NoShell {
        /// Name of the failing command.
        name: String,
    },

    /// Captured output could not be written to its export destination.
    #[error("writing output of command {name:?} to {path}: {source}")]
    ExportWrite {
        /// Name of the command whose output was being written.
        name: String,
        /// Destination path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Template evaluation failure for one document.
#[derive(Error, Debug)]
#[error("rendering {file}: {source}")]
pub struct RenderError {
    /// Path of the file whose document failed to render.
    pub file: String,
    /// Underlying engine error.
    pub source: handlebars::RenderError,
}
