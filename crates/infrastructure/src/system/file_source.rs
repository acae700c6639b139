use ferrous_proxy_application::ports::FileSource;
use ferrous_proxy_domain::DomainError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads files from the local filesystem. Relative paths are resolved
/// against `base_dir` when one is set, usually the directory of the
/// configuration file.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSource {
    base_dir: Option<PathBuf>,
}

impl LocalFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Uses the parent directory of `config_path` as base.
    pub fn relative_to(config_path: &str) -> Self {
        match Path::new(config_path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::with_base_dir(parent),
            _ => Self::new(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        match &self.base_dir {
            Some(base) if candidate.is_relative() => base.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }
}

impl FileSource for LocalFileSource {
    fn read_to_string(&self, path: &str) -> Result<String, DomainError> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), "Reading file");
        std::fs::read_to_string(&resolved).map_err(|e| DomainError::io(path, e.to_string()))
    }
}
