//! appgen pipeline
//!
//! Everything that touches the outside world lives here: the schema drafter
//! (HTTP), the artifact writer (filesystem) and the progress sinks. The
//! [`Orchestrator`] strings them together with the pure normalizer and
//! emitters.

pub mod drafter;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod writer;

pub use drafter::{DraftError, OpenAiConfig, OpenAiDrafter, SchemaDrafter};
pub use error::GenerateError;
pub use orchestrator::{GenerateOptions, GenerationReport, Orchestrator, Source, DSL_FILE};
pub use progress::{ChannelSink, ConsoleSink, JsonLinesSink, ProgressEvent, ProgressSink, SinkEvent, Step};
pub use writer::ArtifactWriter;
