//! Artifact sinks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Folder below a local sink's root that receives generated files.
pub const GENERATED_DIR: &str = "src-gen";

/// Destination for generated files.
pub trait ArtifactSink {
    /// Stores `contents` as `file_name` below `path_name`, replacing any
    /// existing file of that name. An empty `path_name` selects the sink's
    /// default folder.
    ///
    /// Returns the location written, or `None` if the file could not be
    /// created.
    fn make_file(&mut self, path_name: &str, file_name: &str, contents: &[u8]) -> Option<PathBuf>;

    /// Removes a file previously returned by `make_file`.
    ///
    /// Returns false if the file could not be removed. Sinks that cannot
    /// remove files keep the default.
    fn remove_file(&mut self, _location: &Path) -> bool {
        false
    }
}

/// Sink that keeps files in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents stored for a file.
    #[must_use]
    pub fn get(&self, path_name: &str, file_name: &str) -> Option<&[u8]> {
        self.files
            .get(&Path::new(path_name).join(file_name))
            .map(Vec::as_slice)
    }

    /// Returns the contents stored for a file as text.
    #[must_use]
    pub fn get_str(&self, path_name: &str, file_name: &str) -> Option<&str> {
        self.get(path_name, file_name)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Iterates over stored files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_slice()))
    }

    /// Number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn make_file(&mut self, path_name: &str, file_name: &str, contents: &[u8]) -> Option<PathBuf> {
        let path = Path::new(path_name).join(file_name);
        self.files.insert(path.clone(), contents.to_vec());
        Some(path)
    }

    fn remove_file(&mut self, location: &Path) -> bool {
        self.files.remove(location).is_some()
    }
}

/// Sink that writes below `<root>/src-gen/`.
#[derive(Debug, Clone)]
pub struct LocalFileSink {
    root: PathBuf,
}

impl LocalFileSink {
    /// Creates a sink rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the folder that receives files for `path_name`.
    #[must_use]
    pub fn output_dir(&self, path_name: &str) -> PathBuf {
        self.root.join(GENERATED_DIR).join(path_name)
    }

    fn write(&self, path_name: &str, file_name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let dir = self.output_dir(path_name);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

impl ArtifactSink for LocalFileSink {
    fn make_file(&mut self, path_name: &str, file_name: &str, contents: &[u8]) -> Option<PathBuf> {
        match self.write(path_name, file_name, contents) {
            Ok(path) => {
                tracing::info!("Wrote {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("Unable to write {}: {}", file_name, e);
                None
            }
        }
    }

    fn remove_file(&mut self, location: &Path) -> bool {
        match std::fs::remove_file(location) {
            Ok(()) => {
                tracing::info!("Removed {}", location.display());
                true
            }
            Err(e) => {
                tracing::error!("Unable to remove {}: {}", location.display(), e);
                false
            }
        }
    }
}
