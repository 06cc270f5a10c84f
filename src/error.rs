/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Houdini-Build error types to provide consistent
    diagnostics and exit semantics for the CI pipeline.

  Security / Safety Notes:
    Error contexts never carry client secrets or access tokens;
    only versions, URLs and local paths are exposed.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate fatal failures and
    consolidate exit codes for the binary entry point.

  Revision History:
    2025-11-12 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Houdini-Build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Enumerates high-level error domains surfaced by Houdini-Build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Major version {0} is not supported")]
    UnsupportedVersion(String),
    #[error("Required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Authorization: token request failed with status {status}")]
    Authorization { status: u16 },
    #[error("Network: {0}")]
    Network(String),
    #[error("API call `{function}` failed with status {status}: {body}")]
    Api {
        function: String,
        status: u16,
        body: String,
    },
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Error downloading {url}: returned code {status}")]
    Download { url: String, status: u16 },
    #[error("Checksum for {file} does not match (expected {expected}, got {actual})")]
    Integrity {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BuildError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            BuildError::InvalidArgument(_) => 2,
            BuildError::NotFound(_) => 3,
            BuildError::UnsupportedVersion(_) => 4,
            BuildError::CommandMissing { .. } => 10,
            BuildError::Config(_) => 20,
            BuildError::Authorization { .. } => 29,
            BuildError::Network(_) => 30,
            BuildError::Serialization(_) => 31,
            BuildError::Api { .. } => 32,
            BuildError::Download { .. } => 33,
            BuildError::Integrity { .. } => 34,
            BuildError::Filesystem(_) => 40,
            BuildError::Io(_) => 41,
        }
    }
}
