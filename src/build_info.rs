/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::build_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing release builds and product
    downloads returned by the vendor catalog, plus the outcome
    handed to the CI pipeline.

  Security / Safety Notes:
    Pure data containers; no I/O performed in this module.

  Dependencies:
    serde for wire decoding.

  Operational Scope:
    Used across the catalog client, release selection and the
    CI output writer.

  Revision History:
    2025-11-12 COD  Introduced shared build records.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Vendor extras preserved but never interpreted
============================================================*/

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A release build as listed by the vendor catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseRecord {
    pub version: String,
    #[serde(deserialize_with = "string_or_number")]
    pub build: String,
    pub date: String,
    /// Remaining vendor fields (status, release notes, platform...).
    #[serde(flatten)]
    #[allow(dead_code)]
    pub extra: Map<String, Value>,
}

impl ReleaseRecord {
    #[cfg(test)]
    pub fn new(version: &str, build: &str, date: &str) -> Self {
        Self {
            version: version.to_string(),
            build: build.to_string(),
            date: date.to_string(),
            extra: Map::new(),
        }
    }

    /// `{major.minor}.{build}`, the image tag for this release.
    pub fn full_version(&self) -> String {
        format!("{}.{}", self.version, self.build)
    }
}

/// Download location and checksum for a single product artifact.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductInfo {
    pub filename: String,
    pub download_url: String,
    pub hash: String,
}

/// Outcome of a build check that proceeded to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub version: String,
    pub build: String,
    pub launcher_name: String,
    pub iso_name: String,
}

impl BuildResult {
    pub fn full_version(&self) -> String {
        format!("{}.{}", self.version, self.build)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected build as string or number, got {other}"
        ))),
    }
}
