use crate::copy_task::CopyTask;
use crate::error::{CopyError, into_io};
use crate::progress::ProgressInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use sysinfo::Disks;
use tempfile::NamedTempFile;
use tracing::{debug, info, trace};

const STAGING_PREFIX: &str = ".asset-copier-";

/// What happens to earlier copies when a later one fails.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CopyPolicy {
    /// Copy in order and stop at the first failure. Finished copies stay on disk.
    #[default]
    Sequential,
    /// Stage every file next to its destination, then rename them all into place.
    Atomic,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CopyOptions {
    pub policy: CopyPolicy,
    pub check_space: bool,
}

#[derive(Clone, Debug)]
pub struct CopyOutcome {
    pub task: CopyTask,
    pub bytes: u64,
    pub dimensions: Option<(u32, u32)>,
}

impl CopyOutcome {
    fn new(task: &CopyTask, bytes: u64) -> Self {
        let dimensions = image::image_dimensions(&task.dest).ok();
        match dimensions {
            Some((w, h)) => debug!(role = %task.role, width = w, height = h, "asset dimensions"),
            None => debug!(role = %task.role, "asset is not a readable image"),
        }
        Self { task: task.clone(), bytes, dimensions }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CopyReport {
    pub outcomes: Vec<CopyOutcome>,
}

impl CopyReport {
    pub fn total_bytes(&self) -> u64 {
        self.outcomes.iter().map(|o| o.bytes).sum()
    }
}

pub struct AssetCopier {
    tasks: Vec<CopyTask>,
    options: CopyOptions,
    progress: ProgressInfo,
}

impl AssetCopier {
    pub fn new(tasks: Vec<CopyTask>, options: CopyOptions) -> Self {
        let progress = ProgressInfo::new(tasks.len());
        Self { tasks, options, progress }
    }

    pub fn progress(&self) -> &ProgressInfo {
        &self.progress
    }

    pub fn run(&mut self) -> Result<CopyReport, CopyError> {
        if self.options.check_space {
            self.check_space()?;
        }
        let report = match self.options.policy {
            CopyPolicy::Sequential => self.run_sequential()?,
            CopyPolicy::Atomic => self.run_atomic()?,
        };
        info!(files = report.outcomes.len(), bytes = report.total_bytes(), "copy finished");
        Ok(report)
    }

    fn run_sequential(&mut self) -> Result<CopyReport, CopyError> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            info!(role = %task.role, src = %task.src.display(), dest = %task.dest.display(), "copying");
            let bytes = copy_file(&task.src, &task.dest, &mut self.progress)?;
            outcomes.push(CopyOutcome::new(task, bytes));
        }
        Ok(CopyReport { outcomes })
    }

    fn run_atomic(&mut self) -> Result<CopyReport, CopyError> {
        for task in &self.tasks {
            if !task.src.is_file() {
                return Err(CopyError::SourceNotFound { path: task.src.clone() });
            }
            let dir = dest_dir(&task.dest);
            if !dir.is_dir() {
                return Err(CopyError::DestinationUnwritable {
                    path: task.dest.clone(),
                    source: io::Error::new(io::ErrorKind::NotFound, "destination directory does not exist"),
                });
            }
        }

        let staged = stage(&self.tasks, &mut self.progress, copy_file)?;

        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for (task, (tmp, bytes)) in self.tasks.iter().zip(staged) {
            tmp.persist(&task.dest)
                .map_err(|e| CopyError::classify(&task.src, &task.dest, e.error))?;
            debug!(dest = %task.dest.display(), "committed");
            outcomes.push(CopyOutcome::new(task, bytes));
        }
        Ok(CopyReport { outcomes })
    }

    fn check_space(&self) -> Result<(), CopyError> {
        let disks = Disks::new_with_refreshed_list();
        for (dir, needed) in required_space(&self.tasks) {
            match available_space(&disks, &dir) {
                Some(available) => ensure_fits(&dir, needed, available)?,
                None => debug!(dir = %dir.display(), "no disk found, skipping space check"),
            }
        }
        Ok(())
    }
}

/// Copies every source into a temporary next to its destination.
/// Dropping the result on an early return removes whatever was staged so far.
fn stage<F>(tasks: &[CopyTask], progress: &mut ProgressInfo, mut copy: F) -> Result<Vec<(NamedTempFile, u64)>, CopyError>
where
    F: FnMut(&Path, &Path, &mut ProgressInfo) -> Result<u64, CopyError>,
{
    let mut staged = Vec::with_capacity(tasks.len());
    for task in tasks {
        let tmp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(dest_dir(&task.dest))
            .map_err(|source| CopyError::DestinationUnwritable { path: task.dest.clone(), source })?;
        info!(role = %task.role, src = %task.src.display(), staging = %tmp.path().display(), "staging");
        let bytes = copy(&task.src, tmp.path(), progress)?;
        staged.push((tmp, bytes));
    }
    Ok(staged)
}

/// Copies bytes, then gives the destination the source's permissions.
fn copy_file(src: &Path, dest: &Path, progress: &mut ProgressInfo) -> Result<u64, CopyError> {
    let mut options = fs_extra::file::CopyOptions::new();
    options.overwrite = true;
    progress.start_file(dest.to_path_buf());
    let bytes = fs_extra::file::copy_with_progress(src, dest, &options, |info| {
        progress.update_file(info.copied_bytes, info.total_bytes);
        trace!(
            file = ?progress.current_file,
            copied = progress.file_copied_bytes,
            percent = progress.file_progress() * 100.0,
            "progress"
        );
    })
    .map_err(|e| CopyError::classify(src, dest, into_io(e)))?;
    asset_permissions(src)
        .and_then(|perms| fs::set_permissions(dest, perms))
        .map_err(|e| CopyError::classify(src, dest, e))?;
    progress.finish_file(bytes);
    Ok(bytes)
}

/// The source's permissions, kept writable by the owner so the next run can overwrite.
fn asset_permissions(src: &Path) -> io::Result<fs::Permissions> {
    let perms = fs::metadata(src)?.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Ok(fs::Permissions::from_mode(perms.mode() | 0o200))
    }
    #[cfg(not(unix))]
    {
        let mut perms = perms;
        perms.set_readonly(false);
        Ok(perms)
    }
}

fn dest_dir(dest: &Path) -> &Path {
    match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Bytes each destination directory has to take, summed over its tasks.
fn required_space(tasks: &[CopyTask]) -> BTreeMap<PathBuf, u64> {
    let mut required: BTreeMap<PathBuf, u64> = BTreeMap::new();
    for task in tasks {
        let len = fs::metadata(&task.src).map(|m| m.len()).unwrap_or(0);
        *required.entry(dest_dir(&task.dest).to_path_buf()).or_default() += len;
    }
    required
}

fn available_space(disks: &Disks, dir: &Path) -> Option<u64> {
    let dir = dir.canonicalize().ok()?;
    let mounts = disks.list().iter().map(|d| (d.mount_point(), d.available_space()));
    space_on_mount(mounts, &dir)
}

/// Free space of the deepest mount point containing `dir`.
fn space_on_mount<'a>(mounts: impl IntoIterator<Item = (&'a Path, u64)>, dir: &Path) -> Option<u64> {
    mounts
        .into_iter()
        .filter(|(mount, _)| dir.starts_with(mount))
        .max_by_key(|(mount, _)| mount.as_os_str().len())
        .map(|(_, available)| available)
}

fn ensure_fits(dir: &Path, required: u64, available: u64) -> Result<(), CopyError> {
    if required > available {
        return Err(CopyError::InsufficientSpace { path: dir.to_path_buf(), required, available });
    }
    Ok(())
}
