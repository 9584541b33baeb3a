//! appgen Schema Intermediate Representation (IR)
//!
//! Plain data structures shared between:
//! - normalizer (raw document → canonical schema)
//! - emitters (SQL, backend scaffold, frontend scaffold, deployment files)
//! - pipeline (persists the canonical schema as `dsl.json`)
//!
//! Three pieces:
//! 1. Types    — closed enumerations (field type, page kind, policy action)
//! 2. Model    — schema / entity / field / page / policy documents
//! 3. Tables   — per-target type mappings and naming rules every emitter shares

pub mod model;
pub mod naming;
pub mod type_map;
pub mod types;

pub use model::*;
pub use type_map::{TypeTable, UnmappedType, CLIENT_TYPES, SERVICE_TYPES, SQL_TYPES};
pub use types::*;
