//! Application recipe: service account, service install, config and render toolchain

use crate::error::Result;
use crate::install::{InstallSpec, InstallType, PlatformFamily};
use crate::{CONFIG_PATH, SERVICE_HOME, SERVICE_NAME, templates};
use configtree::ConfigNode;
use declarative::{ExecutionPlan, FileMode, Owner, ProvisionStep};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const LIBREOFFICE_TARBALL: &str = "LibreOffice_4.2.4_Linux_x86-64_rpm.tar.gz";

pub const LIBREOFFICE_URL: &str = "http://download.documentfoundation.org/libreoffice/stable/4.2.4/rpm/x86_64/LibreOffice_4.2.4_Linux_x86-64_rpm.tar.gz";

pub const LIBREOFFICE_REPO_DIR: &str = "/opt/yum/libreoffice/";

pub const LIBREOFFICE_REPO_NAME: &str = "libreoffice-local";

/// Installed after the local repository is registered, in this order.
/// The first one refreshes yum metadata so the new repository is seen.
pub const LIBREOFFICE_PACKAGES: [&str; 5] = [
    "libreoffice4.2-calc",
    "libreoffice4.2-impress",
    "libreoffice4.2-math",
    "libreoffice4.2-writer",
    "poppler-utils",
];

pub const SOFFICE_LINK: &str = "/usr/bin/soffice";

pub const SOFFICE_BIN: &str = "/opt/libreoffice4.2/program/soffice.bin";

/// Plan the application recipe.
///
/// `spec` is validated first; after that planning cannot fail except on
/// serializing the configuration.
pub fn plan(spec: &InstallSpec, effective_config: &ConfigNode) -> Result<ExecutionPlan> {
    spec.validate()?;

    let mut plan = ExecutionPlan::new("app");
    let service_owner = Owner::same(SERVICE_NAME);

    plan.push(ProvisionStep::EnsureUser {
        name: SERVICE_NAME.to_string(),
        home: PathBuf::from(SERVICE_HOME),
        manage_home: true,
    });
    plan.push(ProvisionStep::EnsureGroup {
        name: SERVICE_NAME.to_string(),
        members: vec![SERVICE_NAME.to_string()],
    });

    plan.push(ProvisionStep::package("unzip"));
    plan.push(ProvisionStep::package("curl"));

    match spec.install_type {
        InstallType::Package => {
            plan.push(ProvisionStep::package(spec.package_name.as_str()));
        }
        InstallType::Archive => {
            let archive = spec.archive_cache_path();
            let install_dir = spec.install_dir()?.to_path_buf();

            plan.push(ProvisionStep::DownloadArchive {
                source: spec.archive_source_url.clone(),
                destination: archive.clone(),
            });
            plan.push(ProvisionStep::ExtractArchive {
                archive,
                destination: install_dir.clone(),
                guard: spec.target_path.clone(),
                skip_if_exists: true,
            });
            plan.push(ProvisionStep::SetOwnership {
                path: install_dir,
                owner: service_owner.clone(),
                recursive: true,
            });
            plan.push(ProvisionStep::SetFileMode {
                path: spec.target_path.clone(),
                mode: FileMode(0o777),
            });
        }
        InstallType::None => {}
    }

    let mut variables = BTreeMap::new();
    variables.insert("json".to_string(), effective_config.to_pretty_json()?);
    plan.push(ProvisionStep::RenderTemplate {
        template: templates::PREVIEW_CONF.to_string(),
        output_path: PathBuf::from(CONFIG_PATH),
        variables,
        mode: FileMode(0o640),
        owner: service_owner,
    });

    match spec.platform_family {
        PlatformFamily::Rhel => push_rhel_render_toolchain(&mut plan, &spec.cache_dir),
        PlatformFamily::Debian | PlatformFamily::Other => {
            plan.push(ProvisionStep::package("imagemagick"));
        }
    }

    log::debug!(
        "planned {} steps for {} install on {}",
        plan.len(),
        spec.install_type,
        spec.platform_family
    );

    Ok(plan)
}

/// ImageMagick plus LibreOffice served from a local yum repository
fn push_rhel_render_toolchain(plan: &mut ExecutionPlan, cache_dir: &Path) {
    let tarball = cache_dir.join(LIBREOFFICE_TARBALL);

    plan.push(ProvisionStep::package("ImageMagick"));
    plan.push(ProvisionStep::DownloadArchive {
        source: LIBREOFFICE_URL.to_string(),
        destination: tarball.clone(),
    });
    plan.push(ProvisionStep::EnsureDirectory {
        path: PathBuf::from(LIBREOFFICE_REPO_DIR),
        owner: Owner::root(),
        mode: FileMode(0o644),
        recursive: true,
    });
    // createrepo must be present before the repository is indexed
    plan.push(ProvisionStep::package("createrepo"));
    plan.push(ProvisionStep::BuildLocalPackageRepo {
        archive: tarball,
        repo_dir: PathBuf::from(LIBREOFFICE_REPO_DIR),
    });
    plan.push(ProvisionStep::RegisterLocalPackageRepository {
        name: LIBREOFFICE_REPO_NAME.to_string(),
        description: LIBREOFFICE_REPO_NAME.to_string(),
        base_url: format!("file://{LIBREOFFICE_REPO_DIR}"),
        gpg_check: false,
        enabled: true,
    });

    for (i, name) in LIBREOFFICE_PACKAGES.iter().enumerate() {
        let mut step = ProvisionStep::yum_package(*name);
        if i == 0
            && let ProvisionStep::EnsurePackage { flush_cache, .. } = &mut step
        {
            *flush_cache = true;
        }
        plan.push(step);
    }

    plan.push(ProvisionStep::CreateSymlink {
        link: PathBuf::from(SOFFICE_LINK),
        target: PathBuf::from(SOFFICE_BIN),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::PackageProvider;

    fn spec(install_type: InstallType, platform_family: PlatformFamily) -> InstallSpec {
        InstallSpec {
            install_type,
            platform_family,
            package_name: "preview".into(),
            archive_source_url: "https://example/preview.zip".into(),
            target_path: PathBuf::from("/home/preview/preview"),
            cache_dir: PathBuf::from("/var/cache/preview-converge"),
        }
    }

    fn config() -> ConfigNode {
        ConfigNode::new().with("storage", ConfigNode::new().with("engine", "memory"))
    }

    fn kinds(plan: &ExecutionPlan) -> Vec<&'static str> {
        plan.iter().map(ProvisionStep::kind).collect()
    }

    #[test]
    fn test_package_install_adds_named_package() {
        let plan = plan(&spec(InstallType::Package, PlatformFamily::Debian), &config()).unwrap();
        assert_eq!(plan.steps()[4], ProvisionStep::package("preview"));
        assert!(!plan.contains_kind("download_archive"));
    }

    #[test]
    fn test_archive_steps_target_parent_directory() {
        let plan = plan(&spec(InstallType::Archive, PlatformFamily::Debian), &config()).unwrap();
        assert_eq!(
            plan.steps()[5],
            ProvisionStep::ExtractArchive {
                archive: PathBuf::from("/var/cache/preview-converge/preview.zip"),
                destination: PathBuf::from("/home/preview"),
                guard: PathBuf::from("/home/preview/preview"),
                skip_if_exists: true,
            }
        );
        assert_eq!(
            plan.steps()[6],
            ProvisionStep::SetOwnership {
                path: PathBuf::from("/home/preview"),
                owner: Owner::same("preview"),
                recursive: true,
            }
        );
    }

    #[test]
    fn test_template_carries_pretty_json() {
        let plan = plan(&spec(InstallType::None, PlatformFamily::Other), &config()).unwrap();
        let render = plan
            .iter()
            .find(|s| s.kind() == "render_template")
            .unwrap();
        match render {
            ProvisionStep::RenderTemplate {
                template,
                variables,
                mode,
                ..
            } => {
                assert_eq!(template, "preview.conf");
                assert_eq!(*mode, FileMode(0o640));
                assert!(variables["json"].contains("\"engine\": \"memory\""));
            }
            other => panic!("Expected RenderTemplate, got {other:?}"),
        }
    }

    #[test]
    fn test_rhel_toolchain_order() {
        let plan = plan(&spec(InstallType::None, PlatformFamily::Rhel), &config()).unwrap();
        assert_eq!(
            kinds(&plan),
            [
                "ensure_user",
                "ensure_group",
                "ensure_package",
                "ensure_package",
                "render_template",
                "ensure_package",
                "download_archive",
                "ensure_directory",
                "ensure_package",
                "build_local_package_repo",
                "register_local_package_repository",
                "ensure_package",
                "ensure_package",
                "ensure_package",
                "ensure_package",
                "ensure_package",
                "create_symlink",
            ]
        );

        match &plan.steps()[11] {
            ProvisionStep::EnsurePackage {
                name,
                provider,
                flush_cache,
            } => {
                assert_eq!(name, "libreoffice4.2-calc");
                assert_eq!(*provider, PackageProvider::Yum);
                assert!(*flush_cache);
            }
            other => panic!("Expected EnsurePackage, got {other:?}"),
        }
        assert_eq!(
            plan.steps()[12],
            ProvisionStep::yum_package("libreoffice4.2-impress")
        );
    }

    #[test]
    fn test_rejects_invalid_spec() {
        let mut bad = spec(InstallType::Archive, PlatformFamily::Rhel);
        bad.archive_source_url.clear();
        assert!(plan(&bad, &config()).is_err());
    }
}
