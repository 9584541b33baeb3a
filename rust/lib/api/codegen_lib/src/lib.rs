/// Codegen Library - artifact emitters for the appgen pipeline
///
/// Every emitter is a pure function of the canonical schema: it returns an
/// in-memory file tree and never touches the filesystem. The pipeline crate
/// decides where each tree lands.

pub mod backend;
pub mod deploy;
pub mod frontend;
pub mod sql;
pub mod writer;

pub use appgen_ir::Schema;
pub use backend::{emit_backend, BackendGenerator};
pub use deploy::{emit_deploy, DeployGenerator};
pub use frontend::{emit_frontend, FrontendGenerator};
pub use sql::{emit_rollback, emit_schema, SqlGenerator, DEFAULT_NAMESPACE};
pub use writer::CodeWriter;

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error(transparent)]
    UnmappedType(#[from] appgen_ir::UnmappedType),

    #[error("failed to render {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CodegenError>;

/// Codegen trait - implement this for each target
pub trait Codegen {
    fn generate(&self, schema: &Schema) -> Result<GeneratedCode>;
    fn language(&self) -> &str;
}

#[derive(Debug, Default)]
pub struct GeneratedCode {
    pub files: Vec<GeneratedFile>,
}

#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Path relative to the emitter's output root, `/`-separated.
    pub path: String,
    pub content: String,
}

impl GeneratedCode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.push(GeneratedFile {
            path: path.into(),
            content: content.into(),
        });
    }

    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }
}
