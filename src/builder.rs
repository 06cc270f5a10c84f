/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::builder
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Decide which Houdini build the image pipeline should
    produce, gate on already-published tags, and fetch the
    installer artifacts.

  Security / Safety Notes:
    Writes only into the per-version dockerfiles folder that
    must already exist; never creates directories.

  Dependencies:
    catalog, registry and fetch modules.

  Operational Scope:
    Single sequential pass per CI invocation.

  Revision History:
    2025-11-12 COD  Authored build check orchestration.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Validation before side effects
    - Capabilities passed explicitly, no ambient state
============================================================*/

use std::path::{Path, PathBuf};

use crate::build_info::{BuildResult, ReleaseRecord};
use crate::catalog::{BuildCatalog, BuildQuery, HOUDINI_PRODUCT, PLATFORM};
use crate::error::{BuildError, Result};
use crate::fetch::{download_product, Downloader};
use crate::logger::Logger;
use crate::registry::{full_tag_name, TagRegistry};
use crate::release::select_release;
use crate::version::resolve_version;

pub const LAUNCHER_PRODUCT: &str = "houdini-launcher";
pub const ISO_PRODUCT: &str = "launcher-iso";

/// Knobs for a single build check.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Rebuild even when the tag is already published.
    pub force: bool,
    /// Parent of the per-version `{major.minor}` build folders.
    pub dockerfiles_dir: PathBuf,
    pub supported_versions: Vec<String>,
}

impl BuildOptions {
    fn build_folder(&self, version: &str) -> PathBuf {
        self.dockerfiles_dir.join(version)
    }

    fn is_supported(&self, version: &str) -> bool {
        self.supported_versions.iter().any(|v| v == version)
    }
}

/// Query the catalog for the release matching `version_arg`.
pub async fn get_target_release<C>(
    catalog: &C,
    version_arg: &str,
    logger: &Logger,
) -> Result<ReleaseRecord>
where
    C: BuildCatalog + ?Sized,
{
    let spec = resolve_version(version_arg)?;

    let query = BuildQuery {
        product: HOUDINI_PRODUCT.to_string(),
        version: spec.major_minor.clone(),
        platform: PLATFORM.to_string(),
        only_production: spec.production_only(),
    };
    let releases = catalog.list_builds(&query).await?;
    logger.info(
        "CATALOG",
        format!(
            "{} candidate release(s) for version={} production_only={}",
            releases.len(),
            spec.major_minor.as_deref().unwrap_or("any"),
            query.only_production
        ),
    );

    if releases.is_empty() {
        return Err(BuildError::NotFound(format!(
            "No releases matching {} could be found",
            spec.major_minor.as_deref().unwrap_or("any version")
        )));
    }

    select_release(&releases, spec.build.as_deref()).cloned()
}

/// Resolve the target release and, unless its image is already published,
/// download both installer artifacts. `Ok(None)` means the build was skipped.
pub async fn check_build_can_be_installed<C, R>(
    catalog: &C,
    registry: &R,
    downloader: &Downloader,
    version_arg: &str,
    tag_base: &str,
    options: &BuildOptions,
    logger: &Logger,
) -> Result<Option<BuildResult>>
where
    C: BuildCatalog + ?Sized,
    R: TagRegistry + ?Sized,
{
    let release = get_target_release(catalog, version_arg, logger).await?;
    let version = release.version.as_str();

    if !options.is_supported(version) {
        return Err(BuildError::UnsupportedVersion(version.to_string()));
    }

    let full_version = release.full_version();
    logger.info("RELEASE", format!("Selected Houdini {full_version} ({})", release.date));

    let tag_exists = registry.tag_exists(tag_base, &full_version, logger).await?;
    if tag_exists && !options.force {
        logger.info(
            "SKIP",
            format!(
                "{} already exists, skipping",
                full_tag_name(tag_base, &full_version)
            ),
        );
        return Ok(None);
    }
    if tag_exists {
        logger.info("FORCE", "Tag exists but rebuild was forced");
    }

    let build_folder = options.build_folder(version);
    if !build_folder.is_dir() {
        return Err(BuildError::Config(format!(
            "Cannot find dockerfiles for {version} at {}",
            build_folder.display()
        )));
    }

    let launcher = download_product(
        catalog,
        downloader,
        &release,
        LAUNCHER_PRODUCT,
        &build_folder,
        logger,
    )
    .await?;
    let archive = download_product(
        catalog,
        downloader,
        &release,
        ISO_PRODUCT,
        &build_folder,
        logger,
    )
    .await?;

    Ok(Some(BuildResult {
        version: release.version.clone(),
        build: release.build.clone(),
        launcher_name: file_name(&launcher),
        iso_name: file_name(&archive),
    }))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::build_info::ProductInfo;
    use crate::catalog::DownloadRequest;

    const LAUNCHER_BODY: &[u8] = b"launcher-bytes";
    const ISO_BODY: &[u8] = b"iso-bytes";

    struct FakeCatalog {
        releases: Vec<ReleaseRecord>,
        base_url: String,
        queries: Mutex<Vec<BuildQuery>>,
        downloads: Mutex<Vec<DownloadRequest>>,
    }

    impl FakeCatalog {
        fn new(releases: Vec<ReleaseRecord>, base_url: &str) -> Self {
            Self {
                releases,
                base_url: base_url.to_string(),
                queries: Mutex::new(Vec::new()),
                downloads: Mutex::new(Vec::new()),
            }
        }

        fn download_count(&self) -> usize {
            self.downloads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BuildCatalog for FakeCatalog {
        async fn list_builds(&self, query: &BuildQuery) -> Result<Vec<ReleaseRecord>> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.releases.clone())
        }

        async fn download_info(&self, request: &DownloadRequest) -> Result<ProductInfo> {
            self.downloads.lock().unwrap().push(request.clone());
            let (filename, body) = match request.product.as_str() {
                LAUNCHER_PRODUCT => (
                    format!("install_houdini_launcher_{}.{}.sh", request.version, request.build),
                    LAUNCHER_BODY,
                ),
                _ => (
                    format!("houdini-{}.{}-linux_x86_64_gcc11.2.iso", request.version, request.build),
                    ISO_BODY,
                ),
            };
            Ok(ProductInfo {
                download_url: format!("{}/{}", self.base_url, request.product),
                filename,
                hash: format!("{:x}", md5::compute(body)),
            })
        }
    }

    struct FixedRegistry(bool);

    #[async_trait]
    impl TagRegistry for FixedRegistry {
        async fn tag_exists(&self, _tag_base: &str, _version: &str, _logger: &Logger) -> Result<bool> {
            Ok(self.0)
        }
    }

    async fn artifact_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{LAUNCHER_PRODUCT}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(LAUNCHER_BODY.to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{ISO_PRODUCT}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(ISO_BODY.to_vec()))
            .mount(&server)
            .await;
        server
    }

    fn options(root: &Path, force: bool) -> BuildOptions {
        BuildOptions {
            force,
            dockerfiles_dir: root.to_path_buf(),
            supported_versions: vec!["19.5".into(), "20.0".into(), "20.5".into(), "21.0".into()],
        }
    }

    fn downloader() -> Downloader {
        Downloader::new("test-agent").unwrap()
    }

    #[tokio::test]
    async fn end_to_end_production_build() {
        let server = artifact_server().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("20.0")).unwrap();

        let catalog = FakeCatalog::new(
            vec![ReleaseRecord::new("20.0", "724", "2024/05/01")],
            &server.uri(),
        );
        let result = check_build_can_be_installed(
            &catalog,
            &FixedRegistry(false),
            &downloader(),
            "20.0",
            "name/repo",
            &options(dir.path(), false),
            &Logger::quiet(),
        )
        .await
        .unwrap()
        .expect("build should proceed");

        assert_eq!(
            result,
            BuildResult {
                version: "20.0".into(),
                build: "724".into(),
                launcher_name: "install_houdini_launcher_20.0.724.sh".into(),
                iso_name: "houdini-20.0.724-linux_x86_64_gcc11.2.iso".into(),
            }
        );
        let folder = dir.path().join("20.0");
        assert_eq!(std::fs::read(folder.join(&result.launcher_name)).unwrap(), LAUNCHER_BODY);
        assert_eq!(std::fs::read(folder.join(&result.iso_name)).unwrap(), ISO_BODY);

        let queries = catalog.queries.lock().unwrap();
        assert_eq!(
            queries.as_slice(),
            &[BuildQuery {
                product: "houdini".into(),
                version: Some("20.0".into()),
                platform: "linux".into(),
                only_production: true,
            }]
        );
        let downloads = catalog.downloads.lock().unwrap();
        let products: Vec<&str> = downloads.iter().map(|d| d.product.as_str()).collect();
        assert_eq!(products, vec![LAUNCHER_PRODUCT, ISO_PRODUCT]);
    }

    #[tokio::test]
    async fn existing_tag_skips_without_download() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FakeCatalog::new(
            vec![ReleaseRecord::new("20.0", "724", "2024/05/01")],
            "http://unused.invalid",
        );
        let result = check_build_can_be_installed(
            &catalog,
            &FixedRegistry(true),
            &downloader(),
            "20.0",
            "name/repo",
            &options(dir.path(), false),
            &Logger::quiet(),
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert_eq!(catalog.download_count(), 0);
    }

    #[tokio::test]
    async fn forced_rebuild_downloads_despite_existing_tag() {
        let server = artifact_server().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("19.5")).unwrap();

        let catalog = FakeCatalog::new(
            vec![ReleaseRecord::new("19.5", "724", "2024/05/01")],
            &server.uri(),
        );
        let result = check_build_can_be_installed(
            &catalog,
            &FixedRegistry(true),
            &downloader(),
            "19.5.724",
            "name/repo",
            &options(dir.path(), true),
            &Logger::quiet(),
        )
        .await
        .unwrap()
        .expect("forced build should proceed");

        assert_eq!(result.full_version(), "19.5.724");
        assert_eq!(catalog.download_count(), 2);
        assert!(!catalog.queries.lock().unwrap()[0].only_production);
    }

    #[tokio::test]
    async fn unsupported_version_fails_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FakeCatalog::new(
            vec![ReleaseRecord::new("19.0", "724", "2024/05/01")],
            "http://unused.invalid",
        );
        let result = check_build_can_be_installed(
            &catalog,
            &FixedRegistry(false),
            &downloader(),
            "19.0",
            "name/repo",
            &options(dir.path(), false),
            &Logger::quiet(),
        )
        .await;

        assert!(matches!(result, Err(BuildError::UnsupportedVersion(v)) if v == "19.0"));
        assert_eq!(catalog.download_count(), 0);
    }

    #[tokio::test]
    async fn missing_build_folder_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FakeCatalog::new(
            vec![ReleaseRecord::new("20.5", "100", "2024/05/01")],
            "http://unused.invalid",
        );
        let result = check_build_can_be_installed(
            &catalog,
            &FixedRegistry(false),
            &downloader(),
            "",
            "name/repo",
            &options(dir.path(), false),
            &Logger::quiet(),
        )
        .await;

        assert!(matches!(result, Err(BuildError::Config(_))));
        assert_eq!(catalog.download_count(), 0);
    }

    #[tokio::test]
    async fn empty_catalog_is_not_found() {
        let catalog = FakeCatalog::new(Vec::new(), "http://unused.invalid");
        let result = get_target_release(&catalog, "21.0", &Logger::quiet()).await;
        assert!(matches!(result, Err(BuildError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_hint_never_reaches_catalog() {
        let catalog = FakeCatalog::new(Vec::new(), "http://unused.invalid");
        let result = get_target_release(&catalog, "20", &Logger::quiet()).await;
        assert!(matches!(result, Err(BuildError::InvalidArgument(_))));
        assert!(catalog.queries.lock().unwrap().is_empty());
    }
}
