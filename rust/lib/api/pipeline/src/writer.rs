//! Writes generated file trees under an output root.

use std::path::{Path, PathBuf};

use appgen_codegen_lib::GeneratedCode;
use tracing::debug;

use crate::GenerateError;

/// Writes artifacts below `root`, creating directories as needed, and keeps
/// the list of everything written.
#[derive(Debug)]
pub struct ArtifactWriter {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one file. `rel` is `/`-separated and relative to the root.
    /// Existing files are overwritten.
    pub fn write(&mut self, rel: &str, content: &str) -> Result<PathBuf, GenerateError> {
        let path = rel
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |p, seg| p.join(seg));

        if let Some(parent) = path.parent() {
            if !parent.is_dir() {
                std::fs::create_dir_all(parent).map_err(|e| GenerateError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(&path, content).map_err(|e| GenerateError::Io {
            path: path.clone(),
            source: e,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "wrote artifact");
        self.written.push(path.clone());
        Ok(path)
    }

    /// Write every file of an emitter tree under `prefix` (empty for the root).
    pub fn write_tree(&mut self, prefix: &str, code: &GeneratedCode) -> Result<usize, GenerateError> {
        for file in &code.files {
            let rel = if prefix.is_empty() {
                file.path.clone()
            } else {
                format!("{prefix}/{}", file.path)
            };
            self.write(&rel, &file.content)?;
        }
        Ok(code.files.len())
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}
