//! Platform family detection from os-release

use cookbook::PlatformFamily;
use std::fs;
use std::path::Path;

pub const OS_RELEASE: &str = "/etc/os-release";

/// Distribution ids that belong to each family
const RHEL_IDS: [&str; 6] = ["rhel", "centos", "fedora", "amzn", "rocky", "almalinux"];
const DEBIAN_IDS: [&str; 3] = ["debian", "ubuntu", "linuxmint"];

/// Detect the family of this host; unreadable files yield `Other`
pub fn detect() -> PlatformFamily {
    detect_from(Path::new(OS_RELEASE))
}

pub fn detect_from(path: &Path) -> PlatformFamily {
    match fs::read_to_string(path) {
        Ok(content) => {
            let family = family_from_os_release(&content);
            log::debug!("{} identifies platform family {family}", path.display());
            family
        }
        Err(e) => {
            log::warn!("Could not read {}: {e}", path.display());
            PlatformFamily::Other
        }
    }
}

/// Classify os-release content by `ID`, then by each `ID_LIKE` entry
pub fn family_from_os_release(content: &str) -> PlatformFamily {
    let mut id = None;
    let mut id_like = Vec::new();

    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        match key.trim() {
            "ID" => id = Some(value.to_lowercase()),
            "ID_LIKE" => id_like = value.split_whitespace().map(str::to_lowercase).collect(),
            _ => {}
        }
    }

    id.iter()
        .chain(id_like.iter())
        .find_map(|candidate| classify(candidate))
        .unwrap_or(PlatformFamily::Other)
}

fn classify(id: &str) -> Option<PlatformFamily> {
    if RHEL_IDS.contains(&id) {
        Some(PlatformFamily::Rhel)
    } else if DEBIAN_IDS.contains(&id) {
        Some(PlatformFamily::Debian)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_centos() {
        let content = r#"NAME="CentOS Linux"
VERSION="7 (Core)"
ID="centos"
ID_LIKE="rhel fedora"
"#;
        assert_eq!(family_from_os_release(content), PlatformFamily::Rhel);
    }

    #[test]
    fn test_ubuntu() {
        let content = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n";
        assert_eq!(family_from_os_release(content), PlatformFamily::Debian);
    }

    #[test]
    fn test_id_like_fallback() {
        let content = "ID=\"ol\"\nID_LIKE=\"fedora\"\n";
        assert_eq!(family_from_os_release(content), PlatformFamily::Rhel);
    }

    #[test]
    fn test_unknown_distribution() {
        assert_eq!(
            family_from_os_release("ID=alpine\n"),
            PlatformFamily::Other
        );
        assert_eq!(family_from_os_release(""), PlatformFamily::Other);
    }

    #[test]
    fn test_detect_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, "ID=debian\n").unwrap();
        assert_eq!(detect_from(&path), PlatformFamily::Debian);
        assert_eq!(
            detect_from(&dir.path().join("missing")),
            PlatformFamily::Other
        );
    }
}
