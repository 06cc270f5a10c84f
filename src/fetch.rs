/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::fetch
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Download product artifacts into the build folder and
    verify them against the vendor-supplied checksum.

  Security / Safety Notes:
    Download URLs are pre-signed by the vendor; no credentials
    are attached. Partially written files are left in place
    for the operator to inspect.

  Dependencies:
    reqwest for streaming downloads, md5 for the vendor hash.

  Operational Scope:
    Runs once per product after the publish gate passes.

  Revision History:
    2025-11-12 COD  Authored artifact fetcher.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Integrity verification before results are reported
    - Explicit failure on any non-OK HTTP status
============================================================*/

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tokio::io::AsyncWriteExt;

use crate::build_info::ReleaseRecord;
use crate::catalog::{BuildCatalog, DownloadRequest, PLATFORM};
use crate::error::{BuildError, Result};
use crate::logger::Logger;

/// Streams artifacts to disk.
#[derive(Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|err| BuildError::Network(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }

    /// Save `url` to `target`. Anything but `200 OK` is a download failure.
    pub async fn download_file(&self, url: &str, target: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| BuildError::Network(format!("GET {url} failed: {err}")))?;

        if response.status() != StatusCode::OK {
            return Err(BuildError::Download {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(target).await.map_err(|err| {
            BuildError::Filesystem(format!("Failed to create {}: {err}", target.display()))
        })?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| BuildError::Network(format!("Error while downloading {url}: {err}")))?
        {
            file.write_all(&chunk).await.map_err(|err| {
                BuildError::Filesystem(format!("Error writing {}: {err}", target.display()))
            })?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Hex MD5 digest of the file at `path`.
pub fn file_md5(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|err| {
        BuildError::Filesystem(format!("Failed to open {} for hashing: {err}", path.display()))
    })?;
    let mut context = md5::Context::new();
    io::copy(&mut file, &mut context)?;
    Ok(format!("{:x}", context.compute()))
}

/// Compare the file digest with `expected` using exact string equality.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let actual = file_md5(path)?;
    if actual != expected {
        return Err(BuildError::Integrity {
            file: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Resolve, download and verify one product of `release` into `target_folder`.
pub async fn download_product<C>(
    catalog: &C,
    downloader: &Downloader,
    release: &ReleaseRecord,
    product: &str,
    target_folder: &Path,
    logger: &Logger,
) -> Result<PathBuf>
where
    C: BuildCatalog + ?Sized,
{
    let info = catalog
        .download_info(&DownloadRequest {
            product: product.to_string(),
            version: release.version.clone(),
            build: release.build.clone(),
            platform: PLATFORM.to_string(),
        })
        .await?;

    let target = target_folder.join(&info.filename);
    logger.debug(
        "DOWNLOAD",
        format!("{product}: {} -> {}", info.download_url, target.display()),
    );

    let bytes = downloader.download_file(&info.download_url, &target).await?;
    logger.info(
        "DOWNLOAD",
        format!("Downloaded file: {} ({bytes} bytes)", target.display()),
    );

    verify_checksum(&target, &info.hash)?;
    logger.debug("CHECKSUM", format!("{} verified", info.filename));

    Ok(target)
}
