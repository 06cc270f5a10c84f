/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::registry
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Ask the container registry whether an image tag has
    already been published.

  Security / Safety Notes:
    Executes the registry CLI (docker by default) with user
    privileges only; registry credentials are whatever the CLI
    is already logged in with.

  Dependencies:
    tokio::process for async command execution.

  Operational Scope:
    Publish gate between release selection and downloads.

  Revision History:
    2025-11-12 COD  Crafted registry inspection layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Reusable helpers for external command diagnostics
============================================================*/

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{BuildError, Result};
use crate::logger::Logger;

/// `{namespace}:{version}`.
pub fn full_tag_name(tag_base: &str, version: &str) -> String {
    format!("{tag_base}:{version}")
}

/// Registry lookup used to skip builds that are already published.
#[async_trait]
pub trait TagRegistry: Send + Sync {
    async fn tag_exists(&self, tag_base: &str, version: &str, logger: &Logger) -> Result<bool>;
}

/// Registry inspection through `<command> manifest inspect <tag>`.
#[derive(Debug, Clone)]
pub struct DockerRegistry {
    command: String,
}

impl DockerRegistry {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl TagRegistry for DockerRegistry {
    /// A non-zero exit is reported as "absent", whatever the cause. Only a
    /// failure to launch the command at all is an error.
    async fn tag_exists(&self, tag_base: &str, version: &str, logger: &Logger) -> Result<bool> {
        let tag_name = full_tag_name(tag_base, version);
        logger.info("REGISTRY", format!("Checking if tag {tag_name} exists"));

        let output = Command::new(&self.command)
            .args(["manifest", "inspect", tag_name.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| map_spawn_error(err, &self.command))?;

        if output.status.success() {
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        logger.warn(
            "REGISTRY",
            format!(
                "`{} manifest inspect {tag_name}` exited with {}; treating tag as absent: {}",
                self.command,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        );
        Ok(false)
    }
}

fn map_spawn_error(err: io::Error, command: &str) -> BuildError {
    if err.kind() == io::ErrorKind::NotFound {
        BuildError::CommandMissing {
            command: command.into(),
        }
    } else {
        BuildError::Filesystem(format!("Failed to spawn {command}: {err}"))
    }
}
