use std::{fs, path::PathBuf};

use directories_next::ProjectDirs;

/// Returns path to database file located in default data dir for application.
pub fn get_database_path() -> PathBuf {
    get_default_data_dir().join("db.sqlite")
}

/// Returns path to log directory located in default data dir for application.
pub fn get_log_dir() -> PathBuf {
    get_default_data_dir().join("logs")
}

fn get_default_data_dir() -> PathBuf {
    match ProjectDirs::from("org", "fileusechecker", "fileusechecker") {
        Some(project_dirs) => {
            let data_dir = project_dirs.data_local_dir().to_path_buf();
            if let Err(e) = fs::create_dir_all(&data_dir) {
                eprintln!(
                    "Warning: Failed to create data directory at {}: {}",
                    data_dir.display(),
                    e
                );
            }
            data_dir
        }
        None => PathBuf::from("."),
    }
}
