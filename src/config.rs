// ABOUTME: Configuration and constants for the Lisp interpreter
// This module contains version info and the sandboxed file I/O configuration

use std::path::PathBuf;

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Nada Lisp";
pub const WELCOME_SUBTITLE: &str = "an exact-rational, tree-walking Lisp";

/// Autoloader search path for `nadalib` directories, checked in order.
pub const AUTOLOAD_SEARCH_PATH: &[&str] = &["./nadalib", "../nadalib"];

/// REPL line history file, capped at this many entries.
pub const HISTORY_MAX_ENTRIES: usize = 1000;

pub fn history_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/nada/history")
}

/// Filesystem sandbox configuration (Component J): the roots `read-file`,
/// `write-file`, and `load-file` may access.
#[derive(Debug, Clone)]
pub struct FsConfig {
    pub allowed_paths: Vec<PathBuf>,
    pub max_file_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            allowed_paths: vec![PathBuf::from("./data"), PathBuf::from("./nadalib")],
            // Default max file size: 10MB
            max_file_size: 10 * 1024 * 1024,
        }
    }
}
