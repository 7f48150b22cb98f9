use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_file(name: &str) -> Option<PathBuf> {
        ProjectDirs::from("", "", "setpace").map(|pd| pd.config_dir().join(name))
    }

    /// Default log location; the TUI owns stdout so logs go to a file
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("setpace");
            Some(state_dir.join("setpace.log"))
        } else {
            ProjectDirs::from("", "", "setpace")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("setpace.log"))
        }
    }
}
