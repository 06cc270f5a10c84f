/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::version
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Turn the operator-supplied version hint into a catalog
    filter: an optional major.minor plus an optional build.

  Security / Safety Notes:
    Pure string handling; no I/O.

  Dependencies:
    None beyond std.

  Operational Scope:
    First step of every build check.

  Revision History:
    2025-11-12 COD  Authored version resolver.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Reject malformed input before any network traffic
============================================================*/

use crate::error::{BuildError, Result};

/// Constraint derived from a version hint such as `""`, `"20.0"` or `"20.0.724"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSpec {
    pub major_minor: Option<String>,
    pub build: Option<String>,
}

impl VersionSpec {
    /// Production builds are requested unless a specific build was named.
    pub fn production_only(&self) -> bool {
        self.build.is_none()
    }
}

/// Parse a version hint. An empty hint means "no constraint"; anything else
/// needs at least a major and a minor component.
pub fn resolve_version(version_arg: &str) -> Result<VersionSpec> {
    if version_arg.is_empty() {
        return Ok(VersionSpec::default());
    }

    let components: Vec<&str> = version_arg.split('.').collect();
    if components.len() < 2 {
        return Err(BuildError::InvalidArgument(format!(
            "{version_arg} must have at least 2 components"
        )));
    }

    let major_minor = components[..2].join(".");
    let build = (components.len() > 2).then(|| components[2..].join("."));

    Ok(VersionSpec {
        major_minor: Some(major_minor),
        build,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_component_is_invalid() {
        for bad in ["20", "x"] {
            let err = resolve_version(bad).unwrap_err();
            assert!(matches!(err, BuildError::InvalidArgument(_)), "{bad}");
        }
    }

    #[test]
    fn empty_hint_has_no_constraint() {
        let spec = resolve_version("").unwrap();
        assert_eq!(spec, VersionSpec::default());
        assert!(spec.production_only());
    }

    #[test]
    fn major_minor_only() {
        let spec = resolve_version("20.0").unwrap();
        assert_eq!(spec.major_minor.as_deref(), Some("20.0"));
        assert_eq!(spec.build, None);
    }

    #[test]
    fn build_keeps_trailing_components() {
        let spec = resolve_version("20.0.123").unwrap();
        assert_eq!(spec.build.as_deref(), Some("123"));
        assert!(!spec.production_only());

        let spec = resolve_version("20.0.123.4").unwrap();
        assert_eq!(spec.major_minor.as_deref(), Some("20.0"));
        assert_eq!(spec.build.as_deref(), Some("123.4"));
    }
}
