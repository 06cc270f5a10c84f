/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::output
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Publish the selected build to later CI steps as key=value
    lines in the workflow output file.

  Security / Safety Notes:
    Output is written to the runner-provided path only; values
    are versions and file names, never credentials.

  Dependencies:
    None beyond std.

  Operational Scope:
    Consumed by the image build job that follows.

  Revision History:
    2025-11-12 COD  Authored CI output writer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only writes; earlier steps' outputs survive
    - Fixed key order for reproducible output
============================================================*/

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::build_info::BuildResult;
use crate::error::{BuildError, Result};

/// Render the `key=value` lines for a build result.
pub fn render_outputs(result: &BuildResult) -> String {
    format!(
        "build_version={}\nbuild_full_version={}\nhoudini_launcher_filename={}\nhoudini_iso_filename={}\n",
        result.version,
        result.full_version(),
        result.launcher_name,
        result.iso_name
    )
}

/// Append the build outputs to the CI output file at `path`.
pub fn write_github_output(result: &BuildResult, path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| {
            BuildError::Filesystem(format!(
                "Failed to open CI output file {}: {err}",
                path.display()
            ))
        })?;
    file.write_all(render_outputs(result).as_bytes())
        .map_err(|err| {
            BuildError::Filesystem(format!(
                "Failed to write CI output file {}: {err}",
                path.display()
            ))
        })?;
    Ok(())
}
