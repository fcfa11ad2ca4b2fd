//! Build host recipe: Go toolchain and build-time packages

use declarative::{ExecutionPlan, FileMode, Owner, PackageProvider, ProvisionStep};
use std::path::{Path, PathBuf};

pub const GO_TARBALL: &str = "go1.2.linux-amd64.tar.gz";

pub const GO_URL: &str = "https://storage.googleapis.com/golang/go1.2.linux-amd64.tar.gz";

/// Prefix the Go tarball unpacks into (it carries a top-level `go/`)
pub const GO_INSTALL_PREFIX: &str = "/usr/local";

pub const GO_BINARY: &str = "/usr/local/go/bin/go";

pub const GOPATH: &str = "/opt/go";

/// Packages fetched with `go get`
pub const GO_PACKAGES: [&str; 1] = ["github.com/gpmgo/gopm"];

pub fn plan(cache_dir: &Path) -> ExecutionPlan {
    let tarball = cache_dir.join(GO_TARBALL);
    let mut plan = ExecutionPlan::new("build");

    plan.push(ProvisionStep::package("git"));
    plan.push(ProvisionStep::DownloadArchive {
        source: GO_URL.to_string(),
        destination: tarball.clone(),
    });
    plan.push(ProvisionStep::ExtractArchive {
        archive: tarball,
        destination: PathBuf::from(GO_INSTALL_PREFIX),
        guard: PathBuf::from(GO_BINARY),
        skip_if_exists: true,
    });
    plan.push(ProvisionStep::EnsureDirectory {
        path: PathBuf::from(GOPATH),
        owner: Owner::root(),
        mode: FileMode(0o755),
        recursive: true,
    });
    for name in GO_PACKAGES {
        plan.push(ProvisionStep::EnsurePackage {
            name: name.to_string(),
            provider: PackageProvider::GoGet,
            flush_cache: false,
        });
    }
    plan
}
