use crate::error::Error;
use glob::glob;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A source file queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    size: u64,
}

impl SourceFile {
    /// Check that `path` names a readable regular file and capture its size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let not_accessible = |source| Error::FileNotAccessible {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(not_accessible)?;
        if !metadata.is_file() {
            return Err(not_accessible(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        File::open(path).map_err(not_accessible)?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size recorded when the file was added.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Name sent on the `file` header line; the protocol separates fields by spaces.
    pub fn wire_name(&self) -> String {
        self.path.to_string_lossy().replace(' ', "_")
    }

    pub fn read(&self) -> Result<Vec<u8>, Error> {
        fs::read(&self.path).map_err(|source| Error::FileNotAccessible {
            path: self.path.clone(),
            source,
        })
    }
}

/// Paths matching `pattern`, in the order `glob` yields them. Directories are left out.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let entries = glob(pattern).map_err(|e| {
        Error::invalid("pattern", format!("invalid glob pattern '{}': {}", pattern, e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_dir() => debug!("Skipping directory {}", path.display()),
            Ok(path) => files.push(path),
            Err(e) => {
                return Err(Error::FileNotAccessible {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })
            }
        }
    }

    if files.is_empty() {
        warn!("Pattern '{}' matched no files", pattern);
    }
    Ok(files)
}
