//! Archive download and extraction

use anyhow::{Context, Result, bail};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Largest archive we are willing to download (512 MiB)
const MAX_DOWNLOAD_SIZE: u64 = 512 * 1024 * 1024;

/// Archive formats we can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Guess the format from the file name
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }
}

/// Fetch `url` into `destination`, creating parent directories
pub fn download(url: &str, destination: &Path) -> Result<u64> {
    let agent = ureq::Agent::new_with_defaults();

    let mut response = agent
        .get(url)
        .header("User-Agent", concat!("preview-converge/", env!("CARGO_PKG_VERSION")))
        .call()
        .with_context(|| format!("Failed to download {url}"))?;

    let bytes = response
        .body_mut()
        .with_config()
        .limit(MAX_DOWNLOAD_SIZE)
        .read_to_vec()
        .context("Failed to read response body")?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    // Write beside the target first so an interrupted download never looks complete
    let partial = destination.with_extension("part");
    fs::write(&partial, &bytes)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    fs::rename(&partial, destination)
        .with_context(|| format!("Failed to move download to {}", destination.display()))?;

    log::info!("Downloaded {} bytes to {}", bytes.len(), destination.display());
    Ok(bytes.len() as u64)
}

/// Unpack `archive` into `destination`
pub fn extract(archive: &Path, destination: &Path) -> Result<()> {
    let Some(format) = ArchiveFormat::detect(archive) else {
        bail!("Unsupported archive format: {}", archive.display());
    };

    fs::create_dir_all(destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;

    let file =
        File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;

    match format {
        ArchiveFormat::Zip => extract_zip(file, destination),
        ArchiveFormat::TarGz => extract_targz(file, destination),
    }
    .with_context(|| {
        format!(
            "Failed to extract {} into {}",
            archive.display(),
            destination.display()
        )
    })
}

fn extract_zip(file: File, destination: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
    log::debug!("zip archive has {} entries", archive.len());
    archive.extract(destination)?;
    Ok(())
}

fn extract_targz(file: File, destination: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let decoder = GzDecoder::new(BufReader::new(file));
    let mut archive = Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive.unpack(destination)?;
    Ok(())
}
