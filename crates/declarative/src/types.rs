//! Core types for declarative provisioning

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Output;

/// File ownership as `user:group`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub user: String,
    pub group: String,
}

impl Owner {
    pub fn new(user: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            group: group.into(),
        }
    }

    /// Owner where user and group share a name (e.g. `preview:preview`)
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            user: name.clone(),
            group: name,
        }
    }

    pub fn root() -> Self {
        Self::same("root")
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user, self.group)
    }
}

/// Unix permission bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMode(pub u32);

impl FileMode {
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

/// Which installer handles a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageProvider {
    /// The platform's native package manager (yum or apt)
    #[default]
    System,
    /// Always yum, regardless of platform
    Yum,
    /// `go get` into the configured GOPATH
    GoGet,
}

impl fmt::Display for PackageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageProvider::System => "system",
            PackageProvider::Yum => "yum",
            PackageProvider::GoGet => "go get",
        };
        write!(f, "{name}")
    }
}

/// Init-style service control action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    pub fn verb(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb())
    }
}

/// A single idempotent provisioning step.
///
/// Steps only describe desired state. Every step must be safe to re-apply on
/// a converged host; guards such as `skip_if_exists` on
/// [`ProvisionStep::ExtractArchive`] are evaluated by the applier, never by
/// the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ProvisionStep {
    /// Create the user if absent
    EnsureUser {
        name: String,
        home: PathBuf,
        manage_home: bool,
    },
    /// Create the group if absent and make sure members belong to it
    EnsureGroup { name: String, members: Vec<String> },
    /// Install a package if absent
    EnsurePackage {
        name: String,
        provider: PackageProvider,
        /// Refresh package metadata before installing
        flush_cache: bool,
    },
    /// Fetch a remote archive into a local path
    DownloadArchive { source: String, destination: PathBuf },
    /// Unpack an archive into a directory
    ExtractArchive {
        archive: PathBuf,
        destination: PathBuf,
        /// Path whose existence marks the archive as already extracted
        guard: PathBuf,
        skip_if_exists: bool,
    },
    /// Unpack a package tarball into a directory and index it as a local repository
    BuildLocalPackageRepo { archive: PathBuf, repo_dir: PathBuf },
    EnsureDirectory {
        path: PathBuf,
        owner: Owner,
        mode: FileMode,
        recursive: bool,
    },
    SetOwnership {
        path: PathBuf,
        owner: Owner,
        recursive: bool,
    },
    SetFileMode { path: PathBuf, mode: FileMode },
    /// Render a named template with the given variables
    RenderTemplate {
        template: String,
        output_path: PathBuf,
        variables: BTreeMap<String, String>,
        mode: FileMode,
        owner: Owner,
    },
    RegisterLocalPackageRepository {
        name: String,
        description: String,
        base_url: String,
        gpg_check: bool,
        enabled: bool,
    },
    /// Point `link` at `target`
    CreateSymlink { link: PathBuf, target: PathBuf },
    /// Install a named bundled file
    InstallFile {
        source: String,
        path: PathBuf,
        mode: FileMode,
        owner: Owner,
    },
    EnsureServiceRunning { name: String, action: ServiceAction },
}

impl ProvisionStep {
    /// Install a package with the platform's package manager
    pub fn package(name: impl Into<String>) -> Self {
        Self::EnsurePackage {
            name: name.into(),
            provider: PackageProvider::System,
            flush_cache: false,
        }
    }

    /// Install a package with yum
    pub fn yum_package(name: impl Into<String>) -> Self {
        Self::EnsurePackage {
            name: name.into(),
            provider: PackageProvider::Yum,
            flush_cache: false,
        }
    }

    /// Stable step kind, used for filtering and reporting
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EnsureUser { .. } => "ensure_user",
            Self::EnsureGroup { .. } => "ensure_group",
            Self::EnsurePackage { .. } => "ensure_package",
            Self::DownloadArchive { .. } => "download_archive",
            Self::ExtractArchive { .. } => "extract_archive",
            Self::BuildLocalPackageRepo { .. } => "build_local_package_repo",
            Self::EnsureDirectory { .. } => "ensure_directory",
            Self::SetOwnership { .. } => "set_ownership",
            Self::SetFileMode { .. } => "set_file_mode",
            Self::RenderTemplate { .. } => "render_template",
            Self::RegisterLocalPackageRepository { .. } => "register_local_package_repository",
            Self::CreateSymlink { .. } => "create_symlink",
            Self::InstallFile { .. } => "install_file",
            Self::EnsureServiceRunning { .. } => "ensure_service_running",
        }
    }

    /// Identifier of the thing this step manages, unique within its kind
    pub fn id(&self) -> String {
        match self {
            Self::EnsureUser { name, .. }
            | Self::EnsureGroup { name, .. }
            | Self::EnsurePackage { name, .. }
            | Self::RegisterLocalPackageRepository { name, .. }
            | Self::EnsureServiceRunning { name, .. } => name.clone(),
            Self::DownloadArchive { destination, .. } => destination.display().to_string(),
            Self::ExtractArchive { destination, .. } => destination.display().to_string(),
            Self::BuildLocalPackageRepo { repo_dir, .. } => repo_dir.display().to_string(),
            Self::EnsureDirectory { path, .. }
            | Self::SetOwnership { path, .. }
            | Self::SetFileMode { path, .. }
            | Self::InstallFile { path, .. } => path.display().to_string(),
            Self::RenderTemplate { output_path, .. } => output_path.display().to_string(),
            Self::CreateSymlink { link, .. } => link.display().to_string(),
        }
    }

    /// `kind:id`, unique within a plan
    pub fn qualified_id(&self) -> String {
        format!("{}:{}", self.kind(), self.id())
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match self {
            Self::EnsureUser { name, home, .. } => {
                format!("User {name} (home {})", home.display())
            }
            Self::EnsureGroup { name, members } => {
                if members.is_empty() {
                    format!("Group {name}")
                } else {
                    format!("Group {name} with members {}", members.join(", "))
                }
            }
            Self::EnsurePackage {
                name,
                provider,
                flush_cache,
            } => {
                let mut desc = format!("Package {name} via {provider}");
                if *flush_cache {
                    desc.push_str(" (refresh metadata first)");
                }
                desc
            }
            Self::DownloadArchive {
                source,
                destination,
            } => format!("Download {source} to {}", destination.display()),
            Self::ExtractArchive {
                archive,
                destination,
                guard,
                skip_if_exists,
            } => {
                let mut desc = format!(
                    "Extract {} into {}",
                    archive.display(),
                    destination.display()
                );
                if *skip_if_exists {
                    desc.push_str(&format!(" unless {} exists", guard.display()));
                }
                desc
            }
            Self::BuildLocalPackageRepo { archive, repo_dir } => format!(
                "Unpack {} into {} and index it",
                archive.display(),
                repo_dir.display()
            ),
            Self::EnsureDirectory {
                path, owner, mode, ..
            } => format!("Directory {} ({owner}, {mode})", path.display()),
            Self::SetOwnership {
                path,
                owner,
                recursive,
            } => {
                let scope = if *recursive { " recursively" } else { "" };
                format!("Chown {} to {owner}{scope}", path.display())
            }
            Self::SetFileMode { path, mode } => format!("Chmod {} to {mode}", path.display()),
            Self::RenderTemplate {
                template,
                output_path,
                mode,
                owner,
                ..
            } => format!(
                "Render {template} to {} ({owner}, {mode})",
                output_path.display()
            ),
            Self::RegisterLocalPackageRepository { name, base_url, .. } => {
                format!("Package repository {name} at {base_url}")
            }
            Self::CreateSymlink { link, target } => {
                format!("Symlink {} -> {}", link.display(), target.display())
            }
            Self::InstallFile {
                source,
                path,
                mode,
                owner,
            } => format!("Install {source} to {} ({owner}, {mode})", path.display()),
            Self::EnsureServiceRunning { name, action } => format!("Service {name}: {action}"),
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Result of applying a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Already in the desired state
    NoChange,
    /// Something was created
    Created,
    /// Something existing was changed
    Modified,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped (guard matched, dry run, declined)
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::NoChange => "○",
            Self::Created | Self::Modified => "✓",
            Self::Failed { .. } => "✗",
            Self::Skipped { .. } => "⊘",
        }
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
    /// Steps never attempted because an earlier step failed
    pub not_attempted: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of steps attempted
    pub fn total(&self) -> usize {
        self.created + self.modified + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
}

/// Output from an external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
        }
    }
}

impl CommandOutput {
    /// A successful run with the given stdout
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            success: true,
        }
    }

    /// A failed run with the given stderr
    pub fn failed(stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into(),
            success: false,
        }
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}
