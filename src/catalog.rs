/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::catalog
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Query the SideFX web API for release builds and product
    download locations.

  Security / Safety Notes:
    Client credentials are only sent to the token endpoint via
    HTTP Basic auth; the bearer token is held in memory and
    never logged.

  Dependencies:
    reqwest for HTTP, serde for request/response encoding,
    async-trait for the catalog capability seam.

  Operational Scope:
    Supplies candidate releases and artifact URLs to the build
    check.

  Revision History:
    2025-11-12 COD  Implemented authenticated catalog client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Structured response parsing with explicit error paths
    - Configurable endpoints and timeouts
============================================================*/

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::build_info::{ProductInfo, ReleaseRecord};
use crate::config::ApiConfig;
use crate::error::{BuildError, Result};

/// Product identifier used when listing release builds.
pub const HOUDINI_PRODUCT: &str = "houdini";
/// Only Linux artifacts are ever installed into the images.
pub const PLATFORM: &str = "linux";

/// Filter for a release listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildQuery {
    pub product: String,
    pub version: Option<String>,
    pub platform: String,
    pub only_production: bool,
}

/// Identifies a single artifact of a resolved release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub product: String,
    pub version: String,
    pub build: String,
    pub platform: String,
}

/// Vendor build catalog as seen by the build check.
#[async_trait]
pub trait BuildCatalog: Send + Sync {
    async fn list_builds(&self, query: &BuildQuery) -> Result<Vec<ReleaseRecord>>;

    async fn download_info(&self, request: &DownloadRequest) -> Result<ProductInfo>;
}

/// Authenticated client for the SideFX web API.
#[derive(Clone)]
pub struct SidefxClient {
    client: reqwest::Client,
    endpoint_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    // One-shot runs finish well inside the token lifetime.
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: Option<u64>,
}

impl SidefxClient {
    /// Exchange client credentials for an access token and return a ready client.
    pub async fn connect(config: &ApiConfig, client_id: &str, client_secret: &str) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| BuildError::Network(format!("Failed to build HTTP client: {err}")))?;

        let response = client
            .post(&config.token_url)
            .basic_auth(client_id, Some(client_secret))
            .send()
            .await
            .map_err(|err| {
                BuildError::Network(format!(
                    "Token request to {} failed: {err}",
                    config.token_url
                ))
            })?;

        if response.status() != StatusCode::OK {
            return Err(BuildError::Authorization {
                status: response.status().as_u16(),
            });
        }

        let token = response.json::<TokenResponse>().await.map_err(|err| {
            BuildError::Serialization(format!("Failed to decode token response: {err}"))
        })?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            access_token: token.access_token,
        })
    }

    /// Invoke a remote API function with keyword arguments.
    async fn call<T: DeserializeOwned>(&self, function: &str, kwargs: Value) -> Result<T> {
        let payload = json!([function, [], kwargs]).to_string();
        let response = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(&self.access_token)
            .form(&[("json", payload)])
            .send()
            .await
            .map_err(|err| {
                BuildError::Network(format!(
                    "API call {function} to {} failed: {err}",
                    self.endpoint_url
                ))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(BuildError::Api {
                function: function.to_string(),
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        response.json::<T>().await.map_err(|err| {
            BuildError::Serialization(format!("Failed to decode {function} response: {err}"))
        })
    }
}

#[async_trait]
impl BuildCatalog for SidefxClient {
    async fn list_builds(&self, query: &BuildQuery) -> Result<Vec<ReleaseRecord>> {
        let kwargs = serde_json::to_value(query)
            .map_err(|err| BuildError::Serialization(format!("Failed to encode query: {err}")))?;
        self.call("download.get_daily_builds_list", kwargs).await
    }

    async fn download_info(&self, request: &DownloadRequest) -> Result<ProductInfo> {
        let kwargs = serde_json::to_value(request).map_err(|err| {
            BuildError::Serialization(format!("Failed to encode download request: {err}"))
        })?;
        self.call("download.get_daily_build_download", kwargs).await
    }
}
