use crate::copier::{CopyOptions, CopyPolicy};
use crate::copy_task::CopyTask;
use crate::error::CopyError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logo: Option<PathBuf>,
    pub splash: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub policy: CopyPolicy,
    pub check_space: bool,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "example", "AssetCopier").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Reads the per-user config, falling back to defaults when there is none.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(cfg) => {
                    debug!(path = %path.display(), "loaded config");
                    cfg
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unparsable config");
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, CopyError> {
        let config_err = |source: io::Error| CopyError::Config { path: path.to_path_buf(), source };
        let data = fs::read_to_string(path).map_err(config_err)?;
        serde_json::from_str(&data).map_err(|e| config_err(e.into()))
    }

    pub fn save(&self) -> io::Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory for config"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
    }

    pub fn options(&self) -> CopyOptions {
        CopyOptions { policy: self.policy, check_space: self.check_space }
    }

    pub fn tasks(&self) -> Result<Vec<CopyTask>, CopyError> {
        let logo = self.logo.as_deref().ok_or(CopyError::MissingSetting("logo source"))?;
        let splash = self.splash.as_deref().ok_or(CopyError::MissingSetting("splash source"))?;
        let dest = self.destination.as_deref().ok_or(CopyError::MissingSetting("destination directory"))?;
        Ok(CopyTask::plan(logo, splash, dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_from_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = Config {
            logo: Some(PathBuf::from("/a/logo.png")),
            splash: Some(PathBuf::from("/a/splash.png")),
            destination: Some(PathBuf::from("/app/assets/images")),
            policy: CopyPolicy::Atomic,
            check_space: true,
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "destination": "/out" }"#).unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.destination, Some(PathBuf::from("/out")));
        assert_eq!(cfg.policy, CopyPolicy::Sequential);
        assert!(!cfg.check_space);
    }

    #[test]
    fn bad_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CopyError::Config { .. })));
        assert!(matches!(
            Config::load_from(&dir.path().join("absent.json")),
            Err(CopyError::Config { .. })
        ));
    }

    #[test]
    fn unreadable_default_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(&dir.path().join("absent.json")), Config::default());
        // a directory in place of the file fails to read with something other than NotFound
        assert_eq!(Config::load_or_default(dir.path()), Config::default());

        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "check_space": true }"#).unwrap();
        assert!(Config::load_or_default(&path).check_space);
    }

    #[test]
    fn tasks_need_every_path() {
        let mut cfg = Config {
            logo: Some(PathBuf::from("/a/logo.png")),
            destination: Some(PathBuf::from("/out")),
            ..Config::default()
        };
        assert!(matches!(cfg.tasks(), Err(CopyError::MissingSetting("splash source"))));

        cfg.splash = Some(PathBuf::from("/a/splash.png"));
        let tasks = cfg.tasks().unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[1].dest, PathBuf::from("/out/splash-icon.png"));
    }
}
