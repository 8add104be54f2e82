/// Sources of raw log lines fed to the matcher.
///
/// Mirrors the dataset-loader seam: the matcher only needs lines, so
/// files and in-memory fixtures are interchangeable.
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub trait LogSource: Send + Sync {
    /// Load raw log lines, one record per line, untrimmed.
    fn load_lines(&self) -> Result<Vec<String>>;

    /// Name used in reports and log messages.
    fn name(&self) -> &str;
}

/// Log lines read from a UTF-8 file.
pub struct FileLogSource {
    path: PathBuf,
    name: String,
}

impl FileLogSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for FileLogSource {
    fn load_lines(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(content.lines().map(|s| s.to_string()).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fixed lines, for tests and callers that already hold the logs.
pub struct InMemoryLogSource {
    name: String,
    lines: Vec<String>,
}

impl InMemoryLogSource {
    pub fn new(name: &str, lines: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            lines,
        }
    }

    pub fn from_text(name: &str, text: &str) -> Self {
        Self::new(name, text.lines().map(|s| s.to_string()).collect())
    }
}

impl LogSource for InMemoryLogSource {
    fn load_lines(&self) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
