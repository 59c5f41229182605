//! Where the application keeps its files. The contact database lives in the
//! working directory; the log file goes under the user's home so it never
//! clutters the directory the book was opened from.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".contact-book";
/// Log file stored inside the application data directory.
const LOG_FILE_NAME: &str = "contact-book.log";
/// SQLite file name, resolved against the working directory.
pub const DB_FILE_NAME: &str = "contacts.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// `None` disables logging, e.g. when no home directory can be found.
    pub log_path: Option<PathBuf>,
}

impl AppConfig {
    /// Default layout: `contacts.db` in the working directory and the log file
    /// in `~/.contact-book/`.
    pub fn load() -> Self {
        Self {
            db_path: PathBuf::from(DB_FILE_NAME),
            log_path: default_log_path(),
        }
    }

    /// Keep both the database and the log inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            db_path: dir.join(DB_FILE_NAME),
            log_path: Some(dir.join(LOG_FILE_NAME)),
        }
    }
}

/// Resolve the log path inside the user's home, if there is one.
fn default_log_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new()?;
    Some(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
}
