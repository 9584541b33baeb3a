use std::path::PathBuf;

use appgen_codegen_lib::CodegenError;
use appgen_normalize::NormalizeError;

use crate::drafter::DraftError;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read schema file {}: {source}", path.display())]
    ReadDsl {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema file {} is not valid JSON: {source}", path.display())]
    ParseDsl {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize canonical schema: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("a prompt was given but no schema drafter is configured")]
    NoDrafter,

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    Draft(#[from] DraftError),
}
