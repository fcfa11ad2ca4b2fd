//! Default attributes and the base configuration tree

use crate::install::{InstallSpec, InstallType, PlatformFamily};
use configtree::ConfigNode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upload size limit applied to every supported file type (32 MiB)
pub const MAX_UPLOAD_BYTES: i64 = 33_554_432;

/// Render agent worker count
pub const RENDER_AGENT_COUNT: i64 = 8;

/// Recipe inputs for a preview host
///
/// Every field has a default, so a node file only names what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Release platform suffix (e.g. `amd64`)
    pub platform: String,
    /// Release version
    pub version: String,
    pub install_type: InstallType,
    /// Package name for `package` installs
    pub package: String,
    /// Explicit archive url; derived from version and platform when unset
    pub archive_source: Option<String>,
    /// HTTP port the service listens on
    pub port: u16,
    /// Data directory prefix, with trailing slash
    pub base_path: String,
    /// Installed service binary
    pub target_path: PathBuf,
    /// Download cache
    pub cache_dir: PathBuf,
    /// Platform family; detected from the host when unset
    pub platform_family: Option<PlatformFamily>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            platform: "amd64".to_string(),
            version: "0.1.0".to_string(),
            install_type: InstallType::Archive,
            package: crate::SERVICE_NAME.to_string(),
            archive_source: None,
            port: 8080,
            base_path: "/home/preview/data/".to_string(),
            target_path: PathBuf::from("/home/preview/preview"),
            cache_dir: PathBuf::from("/var/cache/preview-converge"),
            platform_family: None,
        }
    }
}

impl Attributes {
    /// Release archive url for the configured version and platform
    pub fn archive_source_url(&self) -> String {
        match &self.archive_source {
            Some(url) => url.clone(),
            None => format!(
                "https://github.com/ngerakines/preview/releases/download/v{v}/preview-{v}-linux_{p}.zip",
                v = self.version,
                p = self.platform
            ),
        }
    }

    /// Build the install spec for a given platform family
    pub fn install_spec(&self, platform_family: PlatformFamily) -> InstallSpec {
        InstallSpec {
            install_type: self.install_type,
            platform_family,
            package_name: self.package.clone(),
            archive_source_url: self.archive_source_url(),
            target_path: self.target_path.clone(),
            cache_dir: self.cache_dir.clone(),
        }
    }

    fn data_path(&self, suffix: &str) -> String {
        format!("{}{}", self.base_path, suffix)
    }

    fn supported_file_types(extensions: &[&str]) -> ConfigNode {
        extensions
            .iter()
            .map(|ext| (*ext, MAX_UPLOAD_BYTES))
            .collect()
    }

    /// The base configuration tree written to the service config file
    pub fn default_config(&self) -> ConfigNode {
        let common = ConfigNode::new()
            .with("placeholderBasePath", self.data_path("placeholders"))
            .with(
                "placeholderGroups",
                ConfigNode::new()
                    .with("image", vec!["jpg", "jpeg", "png", "gif"])
                    .with("document", vec!["pdf", "doc", "docx"])
                    .with("presentation", vec!["ppt", "pptx"]),
            )
            .with("localAssetStoragePath", self.data_path("assets"))
            .with("nodeId", "E876F147E331");

        let document_render_agent = ConfigNode::new()
            .with("enabled", true)
            .with("count", RENDER_AGENT_COUNT)
            .with("basePath", self.data_path("tmp/documentRenderAgent/"))
            .with(
                "supportedFileTypes",
                Self::supported_file_types(&["doc", "docx", "ppt", "pptx"]),
            );

        let image_magick_render_agent = ConfigNode::new()
            .with("enabled", true)
            .with("count", RENDER_AGENT_COUNT)
            .with(
                "supportedFileTypes",
                Self::supported_file_types(&["jpg", "jpeg", "png", "gif", "pdf"]),
            );

        ConfigNode::new()
            .with("common", common)
            .with(
                "http",
                ConfigNode::new().with("listen", format!(":{}", self.port)),
            )
            .with("storage", ConfigNode::new().with("engine", "memory"))
            .with("documentRenderAgent", document_render_agent)
            .with("imageMagickRenderAgent", image_magick_render_agent)
            .with(
                "simpleApi",
                ConfigNode::new()
                    .with("enabled", true)
                    .with("baseUrl", "/api")
                    .with("edgeBaseUrl", format!("http://localhost:{}", self.port)),
            )
            .with("assetApi", ConfigNode::new().with("enabled", true))
            .with("uploader", ConfigNode::new().with("engine", "local"))
            .with(
                "downloader",
                ConfigNode::new()
                    .with("basePath", self.data_path("tmp/downloads/"))
                    .with("tramEnabled", false),
            )
    }
}
