use std::fmt;
use std::path::{Path, PathBuf};

/// Which slot in the app's asset folder a task fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetRole {
    Icon,
    Splash,
    AdaptiveIcon,
}

impl AssetRole {
    pub fn file_name(self) -> &'static str {
        match self {
            AssetRole::Icon => "icon.png",
            AssetRole::Splash => "splash-icon.png",
            AssetRole::AdaptiveIcon => "adaptive-icon.png",
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyTask {
    pub role: AssetRole,
    pub src: PathBuf,
    pub dest: PathBuf,
}

impl CopyTask {
    pub fn new(role: AssetRole, src: &Path, dest_dir: &Path) -> Self {
        Self {
            role,
            src: src.to_path_buf(),
            dest: dest_dir.join(role.file_name()),
        }
    }

    /// The three tasks in the order they must run. The logo feeds both icon slots.
    pub fn plan(logo: &Path, splash: &Path, dest_dir: &Path) -> Vec<CopyTask> {
        vec![
            CopyTask::new(AssetRole::Icon, logo, dest_dir),
            CopyTask::new(AssetRole::Splash, splash, dest_dir),
            CopyTask::new(AssetRole::AdaptiveIcon, logo, dest_dir),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_keeps_fixed_order_and_names() {
        let tasks = CopyTask::plan(Path::new("/in/logo.png"), Path::new("/in/splash.png"), Path::new("/out"));

        let roles: Vec<_> = tasks.iter().map(|t| t.role).collect();
        assert_eq!(roles, [AssetRole::Icon, AssetRole::Splash, AssetRole::AdaptiveIcon]);

        assert_eq!(tasks[0].src, PathBuf::from("/in/logo.png"));
        assert_eq!(tasks[0].dest, PathBuf::from("/out/icon.png"));
        assert_eq!(tasks[1].src, PathBuf::from("/in/splash.png"));
        assert_eq!(tasks[1].dest, PathBuf::from("/out/splash-icon.png"));
        assert_eq!(tasks[2].src, PathBuf::from("/in/logo.png"));
        assert_eq!(tasks[2].dest, PathBuf::from("/out/adaptive-icon.png"));
    }
}
