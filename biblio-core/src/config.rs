//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "library": {
//!     "booksFile": "books.txt",
//!     "usersFile": "users.txt",
//!     "librarianPassword": "admin123",
//!     "requireRegisteredUsers": false
//!   }
//! }
//! ```
//! Sections and keys this crate does not manage are ignored.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

const SETTINGS_FILENAME: &str = "settings.json";
const DEFAULT_BOOKS_FILE: &str = "books.txt";
const DEFAULT_USERS_FILE: &str = "users.txt";
const DEFAULT_LIBRARIAN_PASSWORD: &str = "admin123";

/// Raw settings.json structure
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    library: LibrarySettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LibrarySettings {
    books_file: Option<String>,
    users_file: Option<String>,
    librarian_password: Option<String>,
    require_registered_users: Option<bool>,
}

/// Library configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Book copies file, relative to the data directory unless absolute
    pub books_file: PathBuf,
    /// Users file, relative to the data directory unless absolute
    pub users_file: PathBuf,
    pub librarian_password: String,
    /// Reject borrow/reserve requests naming an unregistered user id.
    /// Off by default: any non-empty id is accepted.
    pub require_registered_users: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            books_file: PathBuf::from(DEFAULT_BOOKS_FILE),
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            librarian_password: DEFAULT_LIBRARIAN_PASSWORD.to_string(),
            require_registered_users: false,
        }
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    match std::env::var(name).ok().as_deref() {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment overrides (for CI/testing):
    /// - `BIBLIO_LIBRARIAN_PASSWORD`
    /// - `BIBLIO_REQUIRE_REGISTERED_USERS`
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let defaults = Self::default();
        let library = raw.library;

        let librarian_password = std::env::var("BIBLIO_LIBRARIAN_PASSWORD")
            .ok()
            .or(library.librarian_password)
            .unwrap_or(defaults.librarian_password);

        let require_registered_users = parse_bool_env("BIBLIO_REQUIRE_REGISTERED_USERS")
            .or(library.require_registered_users)
            .unwrap_or(defaults.require_registered_users);

        Ok(Self {
            books_file: library.books_file.map(PathBuf::from).unwrap_or(defaults.books_file),
            users_file: library.users_file.map(PathBuf::from).unwrap_or(defaults.users_file),
            librarian_password,
            require_registered_users,
        })
    }

    pub fn books_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.books_file)
    }

    pub fn users_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.users_file)
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILENAME);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}
