/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::release
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Choose the release to install from the catalog candidates:
    an exact build when one was requested, otherwise the most
    recent by date.

  Security / Safety Notes:
    Pure selection over in-memory records.

  Dependencies:
    None beyond std.

  Operational Scope:
    Called once per build check after the catalog query.

  Revision History:
    2025-11-12 COD  Authored release selection policy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering with explicit tie-break
============================================================*/

use crate::build_info::ReleaseRecord;
use crate::error::{BuildError, Result};

/// Pick the release to install.
///
/// With a target build, the first record carrying that build wins regardless
/// of date. Without one, the record with the greatest `date` wins; dates are
/// compared as strings (the catalog emits `YYYY/MM/DD`). Equal dates resolve
/// to the record that appears later in `releases`.
pub fn select_release<'a>(
    releases: &'a [ReleaseRecord],
    build: Option<&str>,
) -> Result<&'a ReleaseRecord> {
    match build {
        Some(target) => releases
            .iter()
            .find(|release| release.build == target)
            .ok_or_else(|| {
                let version = releases
                    .first()
                    .map(|release| release.version.as_str())
                    .unwrap_or("?");
                BuildError::NotFound(format!("Build {version}.{target} not found"))
            }),
        None => releases
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.date.cmp(&b.date).then(ia.cmp(ib)))
            .map(|(_, release)| release)
            .ok_or_else(|| BuildError::NotFound("No release candidates to choose from".into())),
    }
}
