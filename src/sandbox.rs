// ABOUTME: Sandboxed I/O module for the Lisp interpreter
// Provides safe filesystem access using cap-std's capability-based directories

use crate::config::FsConfig;
use cap_std::fs::Dir;

#[cfg(test)]
use std::path::PathBuf;

/// Error type for sandbox operations
#[derive(Debug, Clone)]
pub enum SandboxError {
    PathNotAllowed(String),
    FileNotFound(String),
    FileTooLarge(String),
    IoError(String),
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::PathNotAllowed(path) => {
                write!(f, "Access denied: {} is not in allowed paths", path)
            }
            SandboxError::FileNotFound(path) => {
                write!(f, "File not found: {}", path)
            }
            SandboxError::FileTooLarge(msg) => {
                write!(f, "File too large: {}", msg)
            }
            SandboxError::IoError(msg) => {
                write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SandboxError {}

/// Sandbox for safe file access, using capability-based security via cap-std.
pub struct Sandbox {
    fs_roots: Vec<Dir>,
    fs_config: FsConfig,
}

impl Sandbox {
    /// Create a new sandbox from configuration
    pub fn new(fs_config: FsConfig) -> Result<Self, SandboxError> {
        let mut fs_roots = Vec::new();

        for path in &fs_config.allowed_paths {
            std::fs::create_dir_all(path).map_err(|e| {
                SandboxError::IoError(format!("Cannot create {}: {}", path.display(), e))
            })?;

            let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority()).map_err(|e| {
                SandboxError::IoError(format!("Cannot open {}: {}", path.display(), e))
            })?;

            fs_roots.push(dir);
        }

        Ok(Self { fs_roots, fs_config })
    }

    fn reject_unsafe_path(path: &str) -> Result<(), SandboxError> {
        if path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
            return Err(SandboxError::PathNotAllowed(path.to_string()));
        }
        Ok(())
    }

    /// Find which root directory should be used for a path.
    /// For reading: tries all roots. For writing: always the first root.
    fn find_root_for_path(&self, user_path: &str, write_mode: bool) -> Result<&Dir, SandboxError> {
        if write_mode {
            return self
                .fs_roots
                .first()
                .ok_or_else(|| SandboxError::PathNotAllowed(user_path.to_string()));
        }
        for root in &self.fs_roots {
            if root.metadata(user_path).is_ok() {
                return Ok(root);
            }
        }
        self.fs_roots
            .first()
            .ok_or_else(|| SandboxError::PathNotAllowed(user_path.to_string()))
    }

    pub fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        Self::reject_unsafe_path(path)?;
        let root = self.find_root_for_path(path, false)?;
        root.read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::FileNotFound(path.to_string())
            } else {
                SandboxError::IoError(format!("Cannot read {}: {}", path, e))
            }
        })
    }

    pub fn write_file(&self, path: &str, contents: &str) -> Result<(), SandboxError> {
        Self::reject_unsafe_path(path)?;
        if contents.len() > self.fs_config.max_file_size {
            return Err(SandboxError::FileTooLarge(format!(
                "{} bytes exceeds limit of {} bytes",
                contents.len(),
                self.fs_config.max_file_size
            )));
        }
        let root = self.find_root_for_path(path, true)?;
        root.write(path, contents)
            .map_err(|e| SandboxError::IoError(format!("Cannot write {}: {}", path, e)))
    }

    /// Lists every file directly under `dir` ending in `.scm`, for the
    /// autoloader (Component K).
    pub fn list_scm_files(&self, dir: &str) -> Result<Vec<String>, SandboxError> {
        Self::reject_unsafe_path(dir)?;
        let root = self.find_root_for_path(dir, false)?;
        let entries = root
            .read_dir(dir)
            .map_err(|e| SandboxError::IoError(format!("Cannot list {}: {}", dir, e)))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(|s| s.to_string()))
            .filter(|name| name.ends_with(".scm"))
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn create_test_sandbox() -> (Sandbox, PathBuf) {
        let test_dir = PathBuf::from("./test_sandbox_temp");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();

        let fs_config = FsConfig {
            allowed_paths: vec![test_dir.clone()],
            ..Default::default()
        };

        let sandbox = Sandbox::new(fs_config).unwrap();
        (sandbox, test_dir)
    }

    fn cleanup_test_sandbox(test_dir: &PathBuf) {
        let _ = fs::remove_dir_all(test_dir);
    }

    #[test]
    #[serial]
    fn test_read_file_success() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("test.txt"), "hello world").unwrap();
        assert_eq!(sandbox.read_file("test.txt").unwrap(), "hello world");
        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_write_file_success() {
        let (sandbox, test_dir) = create_test_sandbox();
        sandbox.write_file("output.txt", "test data").unwrap();
        assert_eq!(sandbox.read_file("output.txt").unwrap(), "test data");
        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_path_traversal_rejected() {
        let (sandbox, test_dir) = create_test_sandbox();
        let result = sandbox.read_file("../../../etc/passwd");
        assert!(matches!(result, Err(SandboxError::PathNotAllowed(_))));
        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_absolute_path_rejected() {
        let (sandbox, test_dir) = create_test_sandbox();
        let result = sandbox.read_file("/etc/passwd");
        assert!(matches!(result, Err(SandboxError::PathNotAllowed(_))));
        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_list_scm_files_filters_by_suffix() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("a.scm"), "").unwrap();
        fs::write(test_dir.join("b.txt"), "").unwrap();
        let files = sandbox.list_scm_files(".").unwrap();
        assert_eq!(files, vec!["a.scm".to_string()]);
        cleanup_test_sandbox(&test_dir);
    }
}
