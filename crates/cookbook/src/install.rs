//! Install inputs for the application recipe

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the preview service itself gets onto the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallType {
    /// OS package named by [`InstallSpec::package_name`]
    Package,
    /// Release zip downloaded from [`InstallSpec::archive_source_url`]
    #[default]
    Archive,
    /// Leave installation to someone else
    None,
}

impl InstallType {
    pub fn name(&self) -> &'static str {
        match self {
            InstallType::Package => "package",
            InstallType::Archive => "archive",
            InstallType::None => "none",
        }
    }
}

impl fmt::Display for InstallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for InstallType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "package" => Ok(InstallType::Package),
            "archive" => Ok(InstallType::Archive),
            "none" => Ok(InstallType::None),
            other => Err(Error::InvalidInstallSpec(format!(
                "unknown install type '{other}' (expected package, archive or none)"
            ))),
        }
    }
}

/// OS package-management lineage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    /// RHEL, CentOS and friends (yum)
    Rhel,
    /// Debian, Ubuntu and friends (apt)
    Debian,
    Other,
}

impl PlatformFamily {
    pub fn name(&self) -> &'static str {
        match self {
            PlatformFamily::Rhel => "rhel",
            PlatformFamily::Debian => "debian",
            PlatformFamily::Other => "other",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Immutable input to the application planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallSpec {
    pub install_type: InstallType,
    pub platform_family: PlatformFamily,
    pub package_name: String,
    pub archive_source_url: String,
    /// Path of the installed service binary; its parent is the extraction directory
    pub target_path: PathBuf,
    /// Where downloads are cached between runs
    pub cache_dir: PathBuf,
}

impl InstallSpec {
    /// Cache path of the downloaded release archive
    pub fn archive_cache_path(&self) -> PathBuf {
        self.cache_dir.join(crate::RELEASE_ARCHIVE_NAME)
    }

    /// Directory the release archive is extracted into
    ///
    /// # Errors
    ///
    /// Fails if `target_path` has no parent directory.
    pub fn install_dir(&self) -> Result<&Path> {
        self.target_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                Error::InvalidInstallSpec(format!(
                    "target path {} has no parent directory",
                    self.target_path.display()
                ))
            })
    }

    /// Check the fields the selected install type depends on
    pub fn validate(&self) -> Result<()> {
        match self.install_type {
            InstallType::Package => {
                if self.package_name.trim().is_empty() {
                    return Err(Error::InvalidInstallSpec(
                        "package install requires a package name".into(),
                    ));
                }
            }
            InstallType::Archive => {
                if self.archive_source_url.trim().is_empty() {
                    return Err(Error::InvalidInstallSpec(
                        "archive install requires an archive source url".into(),
                    ));
                }
                if !self.target_path.is_absolute() {
                    return Err(Error::InvalidInstallSpec(format!(
                        "target path {} must be absolute",
                        self.target_path.display()
                    )));
                }
                self.install_dir()?;
                if !self.cache_dir.is_absolute() {
                    return Err(Error::InvalidInstallSpec(format!(
                        "cache dir {} must be absolute",
                        self.cache_dir.display()
                    )));
                }
            }
            InstallType::None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_spec() -> InstallSpec {
        InstallSpec {
            install_type: InstallType::Archive,
            platform_family: PlatformFamily::Debian,
            package_name: "preview".into(),
            archive_source_url: "https://example/preview.zip".into(),
            target_path: PathBuf::from("/home/preview/preview"),
            cache_dir: PathBuf::from("/var/cache/preview-converge"),
        }
    }

    #[test]
    fn test_install_type_from_str() {
        assert_eq!("package".parse::<InstallType>().unwrap(), InstallType::Package);
        assert_eq!("ARCHIVE".parse::<InstallType>().unwrap(), InstallType::Archive);
        assert_eq!("none".parse::<InstallType>().unwrap(), InstallType::None);
        assert!("tarball".parse::<InstallType>().is_err());
    }

    #[test]
    fn test_install_dir_and_cache_path() {
        let spec = archive_spec();
        assert_eq!(spec.install_dir().unwrap(), Path::new("/home/preview"));
        assert_eq!(
            spec.archive_cache_path(),
            PathBuf::from("/var/cache/preview-converge/preview.zip")
        );
    }

    #[test]
    fn test_validate_archive() {
        assert!(archive_spec().validate().is_ok());

        let mut spec = archive_spec();
        spec.archive_source_url = "  ".into();
        assert!(matches!(spec.validate(), Err(Error::InvalidInstallSpec(_))));

        let mut spec = archive_spec();
        spec.target_path = PathBuf::from("preview");
        assert!(spec.validate().is_err());

        let mut spec = archive_spec();
        spec.target_path = PathBuf::from("/");
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_package_requires_name() {
        let mut spec = archive_spec();
        spec.install_type = InstallType::Package;
        spec.package_name = String::new();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_none_ignores_other_fields() {
        let mut spec = archive_spec();
        spec.install_type = InstallType::None;
        spec.archive_source_url = String::new();
        spec.package_name = String::new();
        assert!(spec.validate().is_ok());
    }
}
