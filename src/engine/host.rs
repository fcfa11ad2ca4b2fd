//! Applier that converges the local host

use anyhow::{Context, Result, bail};
use colored::Colorize;
use cookbook::{PlatformFamily, files, templates};
use declarative::{
    ApplyResult, CommandRunner, FileMode, Owner, ProvisionStep, ServiceAction, StepApplier,
};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use super::archive;
use super::commands::{self, Invocation, PackageTool};

/// Applies steps to this machine by shelling out through a [`CommandRunner`]
/// and touching the filesystem directly
pub struct HostApplier<R: CommandRunner> {
    runner: R,
    platform_family: PlatformFamily,
    init_dir: PathBuf,
    yum_repos_dir: PathBuf,
    /// Package tools whose metadata was refreshed during this run
    refreshed: HashSet<PackageTool>,
}

impl<R: CommandRunner> HostApplier<R> {
    pub fn new(runner: R, platform_family: PlatformFamily) -> Self {
        Self {
            runner,
            platform_family,
            init_dir: PathBuf::from("/etc/init.d"),
            yum_repos_dir: PathBuf::from("/etc/yum.repos.d"),
            refreshed: HashSet::new(),
        }
    }

    /// Override where init scripts live
    #[cfg(test)]
    pub fn with_init_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.init_dir = dir.into();
        self
    }

    /// Override where yum `.repo` files are written
    #[cfg(test)]
    pub fn with_yum_repos_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.yum_repos_dir = dir.into();
        self
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn succeeds(&self, invocation: &Invocation) -> Result<bool> {
        self.runner
            .run_status(&invocation.program, &invocation.arg_refs())
    }

    fn run_checked(&self, invocation: &Invocation) -> Result<()> {
        log::debug!("running: {invocation}");
        self.runner
            .run_checked(&invocation.program, &invocation.arg_refs())
    }

    fn capture(&self, invocation: &Invocation) -> Result<String> {
        self.runner
            .run_capture(&invocation.program, &invocation.arg_refs())
    }

    fn ensure_user(&self, name: &str, home: &Path, manage_home: bool) -> Result<ApplyResult> {
        if self.succeeds(&commands::user_query(name))? {
            return Ok(ApplyResult::NoChange);
        }
        self.run_checked(&commands::user_add(name, home, manage_home))?;
        Ok(ApplyResult::Created)
    }

    fn ensure_group(&self, name: &str, members: &[String]) -> Result<ApplyResult> {
        let mut result = ApplyResult::NoChange;

        if !self.succeeds(&commands::group_query(name))? {
            self.run_checked(&commands::group_add(name))?;
            result = ApplyResult::Created;
        }

        for member in members {
            let groups = self.capture(&commands::groups_of(member))?;
            if groups.split_whitespace().any(|g| g == name) {
                continue;
            }
            self.run_checked(&commands::group_add_member(name, member))?;
            if result == ApplyResult::NoChange {
                result = ApplyResult::Modified;
            }
        }

        Ok(result)
    }

    fn package_installed(&self, tool: PackageTool, name: &str) -> Result<bool> {
        let Some(query) = commands::package_query(tool, name) else {
            return Ok(commands::go_package_dir(name).exists());
        };
        let output = self.runner.run(&query.program, &query.arg_refs())?;
        Ok(output.success && commands::query_reports_installed(tool, &output.stdout_str()))
    }

    /// Refresh metadata before the first install with `tool` in this run
    ///
    /// A flushing install refreshes by itself, so it only marks the tool.
    fn refresh_metadata(&mut self, tool: PackageTool, flush_cache: bool) -> Result<()> {
        if !self.refreshed.insert(tool) || flush_cache {
            return Ok(());
        }
        if let Some(refresh) = commands::package_refresh(tool) {
            self.run_checked(&refresh)
                .context("Failed to refresh package metadata")?;
        }
        Ok(())
    }

    fn ensure_package(
        &mut self,
        name: &str,
        tool: PackageTool,
        flush_cache: bool,
    ) -> Result<ApplyResult> {
        if self.package_installed(tool, name)? {
            return Ok(ApplyResult::NoChange);
        }
        self.refresh_metadata(tool, flush_cache)?;
        for invocation in commands::package_install(tool, name, flush_cache) {
            self.run_checked(&invocation)
                .with_context(|| format!("Failed to install package {name}"))?;
        }
        Ok(ApplyResult::Created)
    }

    fn download(&self, source: &str, destination: &Path) -> Result<ApplyResult> {
        if destination.exists() {
            return Ok(ApplyResult::NoChange);
        }
        archive::download(source, destination)?;
        Ok(ApplyResult::Created)
    }

    fn extract(
        &self,
        archive_path: &Path,
        destination: &Path,
        guard: &Path,
        skip_if_exists: bool,
    ) -> Result<ApplyResult> {
        if skip_if_exists && guard.exists() {
            return Ok(ApplyResult::Skipped {
                reason: format!("{} exists", guard.display()),
            });
        }
        archive::extract(archive_path, destination)?;
        Ok(ApplyResult::Created)
    }

    fn build_local_repo(&self, archive_path: &Path, repo_dir: &Path) -> Result<ApplyResult> {
        if repo_dir.join("repodata").join("repomd.xml").exists() {
            return Ok(ApplyResult::NoChange);
        }
        archive::extract(archive_path, repo_dir)?;
        self.run_checked(&commands::createrepo(repo_dir))?;
        Ok(ApplyResult::Created)
    }

    fn ensure_directory(
        &self,
        path: &Path,
        owner: &Owner,
        mode: FileMode,
        recursive: bool,
    ) -> Result<ApplyResult> {
        let result = if path.is_dir() {
            ApplyResult::NoChange
        } else {
            if recursive {
                fs::create_dir_all(path)
            } else {
                fs::create_dir(path)
            }
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
            ApplyResult::Created
        };

        let mode_changed = set_mode(path, mode)?;
        let owner_changed = self.set_owner(path, owner, false)?;

        Ok(match result {
            ApplyResult::NoChange if mode_changed || owner_changed => ApplyResult::Modified,
            other => other,
        })
    }

    /// Returns whether ownership of `path` itself had to change
    fn set_owner(&self, path: &Path, owner: &Owner, recursive: bool) -> Result<bool> {
        let current = self.capture(&commands::owner_query(path))?;
        let matches = current.trim() == owner.to_string();
        // Recursive chowns always run so newly extracted files are covered
        if !matches || recursive {
            self.run_checked(&commands::chown(path, owner, recursive))?;
        }
        Ok(!matches)
    }

    fn set_ownership(&self, path: &Path, owner: &Owner, recursive: bool) -> Result<ApplyResult> {
        if !path.exists() {
            bail!("{} does not exist", path.display());
        }
        Ok(if self.set_owner(path, owner, recursive)? {
            ApplyResult::Modified
        } else {
            ApplyResult::NoChange
        })
    }

    fn set_file_mode(&self, path: &Path, mode: FileMode) -> Result<ApplyResult> {
        Ok(if set_mode(path, mode)? {
            ApplyResult::Modified
        } else {
            ApplyResult::NoChange
        })
    }

    /// Write `content` to `path` unless it is already there, then fix mode and owner
    fn write_file(
        &self,
        path: &Path,
        content: &str,
        mode: FileMode,
        owner: &Owner,
    ) -> Result<ApplyResult> {
        let existing = fs::read_to_string(path).ok();

        let result = match existing.as_deref() {
            Some(current) if current == content => ApplyResult::NoChange,
            Some(_) => ApplyResult::Modified,
            None => ApplyResult::Created,
        };

        if result != ApplyResult::NoChange {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            write_staged(path, content, mode)?;
        }

        let mode_changed = set_mode(path, mode)?;
        let owner_changed = self.set_owner(path, owner, false)?;

        Ok(match result {
            ApplyResult::NoChange if mode_changed || owner_changed => ApplyResult::Modified,
            other => other,
        })
    }

    fn render_template(
        &self,
        template: &str,
        output_path: &Path,
        variables: &BTreeMap<String, String>,
        mode: FileMode,
        owner: &Owner,
    ) -> Result<ApplyResult> {
        let content = templates::render(template, variables)?;
        self.write_file(output_path, &content, mode, owner)
    }

    fn register_repo(
        &self,
        name: &str,
        description: &str,
        base_url: &str,
        gpg_check: bool,
        enabled: bool,
    ) -> Result<ApplyResult> {
        let content = commands::yum_repo_file(name, description, base_url, gpg_check, enabled);
        let path = self.yum_repos_dir.join(format!("{name}.repo"));
        self.write_file(&path, &content, FileMode(0o644), &Owner::root())
    }

    fn create_symlink(&self, link: &Path, target: &Path) -> Result<ApplyResult> {
        let result = match fs::read_link(link) {
            Ok(current) if current == target => return Ok(ApplyResult::NoChange),
            Ok(_) => ApplyResult::Modified,
            Err(_) if link.exists() => {
                bail!("{} exists and is not a symlink", link.display())
            }
            Err(_) => ApplyResult::Created,
        };

        if result == ApplyResult::Modified {
            fs::remove_file(link)
                .with_context(|| format!("Failed to remove {}", link.display()))?;
        }
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "Failed to link {} -> {}",
                link.display(),
                target.display()
            )
        })?;
        Ok(result)
    }

    fn install_file(
        &self,
        source: &str,
        path: &Path,
        mode: FileMode,
        owner: &Owner,
    ) -> Result<ApplyResult> {
        let content = files::bundled(source)?;
        self.write_file(path, content, mode, owner)
    }

    fn ensure_service(&self, name: &str, action: ServiceAction) -> Result<ApplyResult> {
        let running = || self.succeeds(&commands::service(&self.init_dir, name, "status"));

        let needed = match action {
            ServiceAction::Start => !running()?,
            ServiceAction::Stop => running()?,
            ServiceAction::Restart => true,
        };
        if !needed {
            return Ok(ApplyResult::NoChange);
        }

        self.run_checked(&commands::service_action(&self.init_dir, name, action))?;
        Ok(ApplyResult::Modified)
    }
}

/// Replace `path` with `content` through a sibling file that has `mode`
/// before any content is written
fn write_staged(path: &Path, content: &str, mode: FileMode) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let staging = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode.bits())
        .open(&staging)
        .with_context(|| format!("Failed to create {}", staging.display()))?;
    // A stale staging file keeps its old mode, and umask narrows a new one
    file.set_permissions(fs::Permissions::from_mode(mode.bits()))
        .with_context(|| format!("Failed to chmod {} to {mode}", staging.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    drop(file);

    fs::rename(&staging, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))
}

/// Set permission bits, returning whether they changed
fn set_mode(path: &Path, mode: FileMode) -> Result<bool> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    if metadata.permissions().mode() & 0o7777 == mode.bits() {
        return Ok(false);
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode.bits()))
        .with_context(|| format!("Failed to chmod {} to {mode}", path.display()))?;
    Ok(true)
}

/// Print a line diff of what rendering would change
fn print_diff(path: &Path, current: &str, proposed: &str) {
    let diff = similar::TextDiff::from_lines(current, proposed);
    println!("    {}", path.display().to_string().bold());
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => print!("    {}", format!("- {change}").red()),
            similar::ChangeTag::Insert => print!("    {}", format!("+ {change}").green()),
            similar::ChangeTag::Equal => {}
        }
    }
}

impl<R: CommandRunner> StepApplier for HostApplier<R> {
    fn apply(&mut self, step: &ProvisionStep) -> Result<ApplyResult> {
        match step {
            ProvisionStep::EnsureUser {
                name,
                home,
                manage_home,
            } => self.ensure_user(name, home, *manage_home),
            ProvisionStep::EnsureGroup { name, members } => self.ensure_group(name, members),
            ProvisionStep::EnsurePackage {
                name,
                provider,
                flush_cache,
            } => {
                let tool = PackageTool::select(*provider, self.platform_family);
                self.ensure_package(name, tool, *flush_cache)
            }
            ProvisionStep::DownloadArchive {
                source,
                destination,
            } => self.download(source, destination),
            ProvisionStep::ExtractArchive {
                archive,
                destination,
                guard,
                skip_if_exists,
            } => self.extract(archive, destination, guard, *skip_if_exists),
            ProvisionStep::BuildLocalPackageRepo { archive, repo_dir } => {
                self.build_local_repo(archive, repo_dir)
            }
            ProvisionStep::EnsureDirectory {
                path,
                owner,
                mode,
                recursive,
            } => self.ensure_directory(path, owner, *mode, *recursive),
            ProvisionStep::SetOwnership {
                path,
                owner,
                recursive,
            } => self.set_ownership(path, owner, *recursive),
            ProvisionStep::SetFileMode { path, mode } => self.set_file_mode(path, *mode),
            ProvisionStep::RenderTemplate {
                template,
                output_path,
                variables,
                mode,
                owner,
            } => self.render_template(template, output_path, variables, *mode, owner),
            ProvisionStep::RegisterLocalPackageRepository {
                name,
                description,
                base_url,
                gpg_check,
                enabled,
            } => self.register_repo(name, description, base_url, *gpg_check, *enabled),
            ProvisionStep::CreateSymlink { link, target } => self.create_symlink(link, target),
            ProvisionStep::InstallFile {
                source,
                path,
                mode,
                owner,
            } => self.install_file(source, path, *mode, owner),
            ProvisionStep::EnsureServiceRunning { name, action } => {
                self.ensure_service(name, *action)
            }
        }
    }

    fn preview(&mut self, step: &ProvisionStep) -> Result<ApplyResult> {
        match step {
            ProvisionStep::RenderTemplate {
                template,
                output_path,
                variables,
                ..
            } => {
                let proposed = templates::render(template, variables)?;
                let current = fs::read_to_string(output_path).unwrap_or_default();
                if current == proposed {
                    return Ok(ApplyResult::NoChange);
                }
                print_diff(output_path, &current, &proposed);
                Ok(ApplyResult::Skipped {
                    reason: "Dry run".into(),
                })
            }
            ProvisionStep::ExtractArchive {
                guard,
                skip_if_exists: true,
                ..
            } if guard.exists() => Ok(ApplyResult::Skipped {
                reason: format!("{} exists", guard.display()),
            }),
            ProvisionStep::InstallFile { source, path, .. } => {
                let proposed = files::bundled(source)?;
                if fs::read_to_string(path).is_ok_and(|c| c == proposed) {
                    return Ok(ApplyResult::NoChange);
                }
                Ok(ApplyResult::Skipped {
                    reason: "Dry run".into(),
                })
            }
            _ => Ok(ApplyResult::Skipped {
                reason: "Dry run".into(),
            }),
        }
    }
}
