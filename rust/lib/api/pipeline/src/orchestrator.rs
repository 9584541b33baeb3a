//! One generation run, from source document to written artifact tree.

use std::path::{Path, PathBuf};

use appgen_codegen_lib::{
    emit_backend, emit_deploy, emit_frontend, Codegen, SqlGenerator, DEFAULT_NAMESPACE,
};
use appgen_ir::Schema;
use serde_json::Value;
use tracing::{error, info};

use crate::drafter::SchemaDrafter;
use crate::progress::{ProgressEvent, ProgressSink, Step};
use crate::writer::ArtifactWriter;
use crate::GenerateError;

/// Canonical schema file written at the output root.
pub const DSL_FILE: &str = "dsl.json";

/// Where the raw schema document comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Free-text request, drafted into a document by the configured drafter.
    Prompt(String),
    /// A JSON schema file on disk, e.g. a previously generated `dsl.json`.
    DslFile(PathBuf),
    /// An in-memory document.
    Document(Value),
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// PostgreSQL schema the tables are created in.
    pub namespace: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct GenerationReport {
    pub schema: Schema,
    /// Every file written, in write order.
    pub written: Vec<PathBuf>,
}

/// Runs the steps of a generation in a fixed order and reports each one to
/// the sink. The first failure aborts the run; files already written stay.
pub struct Orchestrator<S: ProgressSink> {
    sink: S,
    drafter: Option<Box<dyn SchemaDrafter>>,
}

impl<S: ProgressSink> Orchestrator<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            drafter: None,
        }
    }

    pub fn with_drafter(mut self, drafter: impl SchemaDrafter + 'static) -> Self {
        self.drafter = Some(Box::new(drafter));
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn generate(
        &mut self,
        source: Source,
        output_root: &Path,
        options: &GenerateOptions,
    ) -> Result<GenerationReport, GenerateError> {
        match self.run(source, output_root, options) {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(error = %e, root = %output_root.display(), "generation failed");
                self.sink.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn run(
        &mut self,
        source: Source,
        output_root: &Path,
        options: &GenerateOptions,
    ) -> Result<GenerationReport, GenerateError> {
        let mut out = ArtifactWriter::new(output_root);

        self.step(Step::Start, "Starting generation");

        let dsl_message = match &source {
            Source::Prompt(_) => "Drafting schema from request".to_string(),
            Source::DslFile(path) => format!("Loading schema from {}", path.display()),
            Source::Document(_) => "Loading schema document".to_string(),
        };
        self.step(Step::Dsl, dsl_message);
        let raw = self.load(source)?;
        let schema = appgen_normalize::normalize(&raw)?;
        let dsl = serde_json::to_string_pretty(&schema).map_err(GenerateError::Serialize)?;
        out.write(DSL_FILE, &dsl)?;
        info!(
            app = %schema.name,
            entities = schema.entities.len(),
            pages = schema.pages.len(),
            "schema ready"
        );

        self.step(Step::Sql, "Generating database migration");
        let sql = SqlGenerator::new(options.namespace.as_str()).generate(&schema)?;
        out.write_tree("", &sql)?;

        self.step(Step::Api, "Generating backend service");
        out.write_tree("backend", &emit_backend(&schema)?)?;

        self.step(Step::Ui, "Generating frontend application");
        out.write_tree("frontend", &emit_frontend(&schema)?)?;

        self.step(Step::Deploy, "Generating deployment files");
        out.write_tree("", &emit_deploy(&schema)?)?;

        self.step(Step::Complete, "Application generated");

        Ok(GenerationReport {
            schema,
            written: out.into_written(),
        })
    }

    fn load(&self, source: Source) -> Result<Value, GenerateError> {
        match source {
            Source::Prompt(prompt) => {
                let drafter = self.drafter.as_ref().ok_or(GenerateError::NoDrafter)?;
                Ok(drafter.draft(&prompt)?)
            }
            Source::DslFile(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| GenerateError::ReadDsl {
                    path: path.clone(),
                    source: e,
                })?;
                serde_json::from_str(&text).map_err(|e| GenerateError::ParseDsl { path, source: e })
            }
            Source::Document(doc) => Ok(doc),
        }
    }

    fn step(&mut self, step: Step, message: impl Into<String>) {
        let event = ProgressEvent::new(step, message);
        info!(step = step.as_str(), percent = event.percent, "{}", event.message);
        self.sink.progress(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ChannelSink, SinkEvent};
    use serde_json::json;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn todo() -> Value {
        json!({
            "name": "Todo",
            "entities": [{"name": "task", "columns": [{"name": "title", "type": "text", "required": true}]}]
        })
    }

    #[test]
    fn test_prompt_without_drafter() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let mut orch = Orchestrator::new(ChannelSink::new(tx));

        let err = orch
            .generate(Source::Prompt("a todo app".into()), dir.path(), &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::NoDrafter));
        drop(orch);

        let events: Vec<SinkEvent> = rx.iter().collect();
        assert!(matches!(events.last(), Some(SinkEvent::Error { .. })));
        assert!(!dir.path().join(DSL_FILE).exists());
    }

    #[test]
    fn test_namespace_reaches_migration() {
        let dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel();
        let mut orch = Orchestrator::new(ChannelSink::new(tx));
        let options = GenerateOptions {
            namespace: "todo".into(),
        };

        orch.generate(Source::Document(todo()), dir.path(), &options).unwrap();

        let sql = std::fs::read_to_string(dir.path().join("migration.sql")).unwrap();
        assert!(sql.contains("CREATE TABLE todo.task ("));
    }

    #[test]
    fn test_missing_dsl_file() {
        let dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel();
        let mut orch = Orchestrator::new(ChannelSink::new(tx));
        let missing = dir.path().join("nope.json");

        let err = orch
            .generate(Source::DslFile(missing.clone()), dir.path(), &GenerateOptions::default())
            .unwrap_err();
        match err {
            GenerateError::ReadDsl { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_dsl_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{ not json").unwrap();
        let (tx, _rx) = mpsc::channel();
        let mut orch = Orchestrator::new(ChannelSink::new(tx));

        let err = orch
            .generate(Source::DslFile(file), &dir.path().join("out"), &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::ParseDsl { .. }));
    }
}
