//! Translation of provisioning steps into the shell commands that apply them
//!
//! Everything here is pure so the exact commands can be tested without a host.

use cookbook::PlatformFamily;
use cookbook::recipes::build::{GO_BINARY, GOPATH};
use declarative::{Owner, PackageProvider, ServiceAction};
use std::fmt;
use std::path::Path;

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Package tool actually used for a provider on a platform family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageTool {
    Yum,
    Apt,
    GoGet,
}

impl PackageTool {
    pub fn select(provider: PackageProvider, family: PlatformFamily) -> Self {
        match (provider, family) {
            (PackageProvider::GoGet, _) => PackageTool::GoGet,
            (PackageProvider::Yum, _) | (PackageProvider::System, PlatformFamily::Rhel) => {
                PackageTool::Yum
            }
            (PackageProvider::System, PlatformFamily::Debian | PlatformFamily::Other) => {
                PackageTool::Apt
            }
        }
    }
}

/// dpkg status of a fully installed package
pub const DPKG_INSTALLED: &str = "install ok installed";

/// Command that reports whether a package is installed
///
/// Success alone is enough for rpm. dpkg also knows removed packages whose
/// config files remain, so its status line is checked with
/// [`query_reports_installed`]. `go get` packages have no query command; see
/// [`go_package_dir`].
pub fn package_query(tool: PackageTool, name: &str) -> Option<Invocation> {
    match tool {
        PackageTool::Yum => Some(Invocation::new("rpm", ["-q", name])),
        PackageTool::Apt => Some(Invocation::new(
            "dpkg-query",
            ["-W", "-f=${Status}", name],
        )),
        PackageTool::GoGet => None,
    }
}

/// Whether the stdout of a successful [`package_query`] means installed
pub fn query_reports_installed(tool: PackageTool, stdout: &str) -> bool {
    match tool {
        PackageTool::Apt => stdout.trim() == DPKG_INSTALLED,
        PackageTool::Yum | PackageTool::GoGet => true,
    }
}

/// Command that refreshes the package tool's metadata
pub fn package_refresh(tool: PackageTool) -> Option<Invocation> {
    match tool {
        PackageTool::Yum => Some(Invocation::new("yum", ["makecache"])),
        PackageTool::Apt => Some(Invocation::new("apt-get", ["update"])),
        PackageTool::GoGet => None,
    }
}

/// Where `go get` leaves a package's sources
pub fn go_package_dir(name: &str) -> std::path::PathBuf {
    Path::new(GOPATH).join("src").join(name)
}

/// Commands that install a package, metadata refresh first when asked
pub fn package_install(tool: PackageTool, name: &str, flush_cache: bool) -> Vec<Invocation> {
    let mut commands = Vec::new();
    match tool {
        PackageTool::Yum => {
            if flush_cache {
                commands.push(Invocation::new("yum", ["clean", "metadata"]));
            }
            commands.push(Invocation::new("yum", ["install", "-y", name]));
        }
        PackageTool::Apt => {
            if flush_cache {
                commands.push(Invocation::new("apt-get", ["update"]));
            }
            commands.push(Invocation::new(
                "apt-get",
                ["install", "-y", "--no-install-recommends", name],
            ));
        }
        PackageTool::GoGet => {
            let gopath = format!("GOPATH={GOPATH}");
            commands.push(Invocation::new(
                "env",
                [gopath.as_str(), GO_BINARY, "get", name],
            ));
        }
    }
    commands
}

pub fn user_query(name: &str) -> Invocation {
    Invocation::new("id", ["-u", name])
}

pub fn user_add(name: &str, home: &Path, manage_home: bool) -> Invocation {
    let home = home.display().to_string();
    let home_flag = if manage_home { "-m" } else { "-M" };
    Invocation::new("useradd", [home_flag, "-d", home.as_str(), name])
}

pub fn group_query(name: &str) -> Invocation {
    Invocation::new("getent", ["group", name])
}

pub fn group_add(name: &str) -> Invocation {
    Invocation::new("groupadd", [name])
}

/// Groups a user belongs to, space separated on stdout
pub fn groups_of(user: &str) -> Invocation {
    Invocation::new("id", ["-nG", user])
}

pub fn group_add_member(group: &str, member: &str) -> Invocation {
    Invocation::new("usermod", ["-a", "-G", group, member])
}

/// `user:group` of a path on stdout
pub fn owner_query(path: &Path) -> Invocation {
    let path = path.display().to_string();
    Invocation::new("stat", ["-c", "%U:%G", path.as_str()])
}

pub fn chown(path: &Path, owner: &Owner, recursive: bool) -> Invocation {
    let path = path.display().to_string();
    let owner = owner.to_string();
    let mut args = Vec::with_capacity(3);
    if recursive {
        args.push("-R".to_string());
    }
    args.push(owner);
    args.push(path);
    Invocation::new("chown", args)
}

pub fn createrepo(repo_dir: &Path) -> Invocation {
    Invocation::new("createrepo", [repo_dir.display().to_string()])
}

/// Init script invocation for a service
pub fn service(init_dir: &Path, name: &str, action: &str) -> Invocation {
    Invocation::new(init_dir.join(name).display().to_string(), [action])
}

pub fn service_action(init_dir: &Path, name: &str, action: ServiceAction) -> Invocation {
    service(init_dir, name, action.verb())
}

/// Contents of a yum `.repo` file
pub fn yum_repo_file(
    name: &str,
    description: &str,
    base_url: &str,
    gpg_check: bool,
    enabled: bool,
) -> String {
    format!(
        "[{name}]\nname={description}\nbaseurl={base_url}\nenabled={}\ngpgcheck={}\n",
        u8::from(enabled),
        u8::from(gpg_check)
    )
}
