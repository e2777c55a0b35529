//! User-facing errors for the checks that run before any file is compiled.
//!
//! Per-file failures (stat, create, compile) are never wrapped in these
//! types; they reach the user with the message the filesystem or the
//! compiler produced.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the source flag is missing.
    pub const MISSING_SOURCE: &str = "Pass the stylesheet directory or file with `--source <path>`";

    /// Suggestion when the destination flag is missing.
    pub const MISSING_DEST: &str = "Pass the output directory or file with `--dest <path>`";
}

/// Errors raised before or outside of per-file conversion.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum SasspilerError {
    #[error("{flag} flag is required")]
    #[diagnostic(code(sasspiler::cli::missing_flag))]
    MissingFlag {
        flag: &'static str,
        #[help]
        help: Option<String>,
    },

    #[error("{} directory does not exist", .path.display())]
    #[diagnostic(code(sasspiler::source_not_found))]
    SourceNotFound { path: PathBuf },

    #[error("failed to read directory {}: {message}", .path.display())]
    #[diagnostic(code(sasspiler::discover::read_dir))]
    ReadDir { path: PathBuf, message: String },

    #[error("sass compiler `{program}` not found")]
    #[diagnostic(
        code(sasspiler::compiler::not_found),
        help("Install Dart Sass (https://sass-lang.com/install) or set `compiler.program` in .sasspiler/config.toml")
    )]
    CompilerNotFound { program: String },
}

impl SasspilerError {
    /// The `--source` flag was not given.
    pub fn missing_source() -> Self {
        SasspilerError::MissingFlag {
            flag: "--source",
            help: Some(suggestions::MISSING_SOURCE.to_string()),
        }
    }

    /// The `--dest` flag was not given.
    pub fn missing_dest() -> Self {
        SasspilerError::MissingFlag {
            flag: "--dest",
            help: Some(suggestions::MISSING_DEST.to_string()),
        }
    }
}
