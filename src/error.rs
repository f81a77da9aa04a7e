use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("source file {} not found", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("cannot write {}: {source}", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {} to {}: {source}", src.display(), dest.display())]
    Io {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "not enough space for {}: {required} bytes needed, {available} available",
        path.display()
    )]
    InsufficientSpace {
        path: PathBuf,
        required: u64,
        available: u64,
    },

    #[error("no {0} configured")]
    MissingSetting(&'static str),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CopyError {
    /// Sorts a failed copy into source, destination or plain I/O trouble.
    pub fn classify(src: &Path, dest: &Path, err: io::Error) -> Self {
        if !src.is_file() {
            return CopyError::SourceNotFound { path: src.to_path_buf() };
        }
        let parent_missing = dest.parent().is_some_and(|p| !p.as_os_str().is_empty() && !p.is_dir());
        if parent_missing || matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) {
            return CopyError::DestinationUnwritable { path: dest.to_path_buf(), source: err };
        }
        CopyError::Io { src: src.to_path_buf(), dest: dest.to_path_buf(), source: err }
    }
}

/// fs_extra wraps io errors in its own kind; unwrap them where it kept the original.
pub fn into_io(err: fs_extra::error::Error) -> io::Error {
    use fs_extra::error::ErrorKind;
    let message = err.to_string();
    match err.kind {
        ErrorKind::Io(e) => e,
        ErrorKind::NotFound => io::Error::new(io::ErrorKind::NotFound, message),
        ErrorKind::PermissionDenied => io::Error::new(io::ErrorKind::PermissionDenied, message),
        _ => io::Error::other(message),
    }
}
