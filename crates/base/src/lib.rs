//! Names, paths and platform conventions shared by the Stamp crates.

pub mod consts;

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use directories::ProjectDirs;

pub const PROJECT_NAME: &str = "stamp";

pub const CLI_PROGRAM_NAME: &str = "stamp";
pub const CLI_CONFIG_NAME: &str = "config.yaml";

/// The platform configuration directory, `~/.config/stamp` on Linux.
pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .expect("Creating `ProjectDirs` should always success")
        .config_dir()
        .to_path_buf()
});

/// Configuration files to look for, most preferred first.
#[must_use]
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut directories = vec![PROJECT_CONFIG_DIR.clone()];
    if let Some(user_dirs) = directories::UserDirs::new() {
        let home = user_dirs.home_dir();
        directories.push([home, Path::new(".config"), Path::new(PROJECT_NAME)].iter().collect());
        directories.push(home.join(format!(".{PROJECT_NAME}")));
    }
    directories.dedup();
    directories.into_iter().map(|directory| directory.join(CLI_CONFIG_NAME)).collect()
}
