//! appgen schema normalizer
//!
//! Turns an untrusted raw document (hand-written `dsl.json` or a drafter
//! response) into a canonical [`Schema`]:
//! - every entity has `id` first-class, `created_at` and `updated_at`
//! - every entity has a list, form and detail page
//! - `version` and `createdAt` are stamped
//!
//! The raw input is never modified. Structural problems are collected across
//! the whole document and reported as one [`NormalizeError`].

mod reader;

use appgen_ir::{
    Entity, Field, Page, PageKind, Schema, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, warn};

pub use reader::StructuralIssue;

/// Name given to documents that don't declare one.
pub const UNTITLED_APP: &str = "Untitled App";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid schema document ({count} problem(s)):\n{rendered}", count = .issues.len(), rendered = render_issues(.issues))]
    Structural { issues: Vec<StructuralIssue> },
}

impl NormalizeError {
    pub fn issues(&self) -> &[StructuralIssue] {
        match self {
            NormalizeError::Structural { issues } => issues,
        }
    }
}

fn render_issues(issues: &[StructuralIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize a raw document, stamping the current time.
pub fn normalize(raw: &Value) -> Result<Schema, NormalizeError> {
    normalize_at(raw, Utc::now())
}

/// Normalize a raw document with an explicit `createdAt`.
pub fn normalize_at(raw: &Value, now: DateTime<Utc>) -> Result<Schema, NormalizeError> {
    let doc = reader::read_document(raw)?;

    let mut entities = doc.entities;
    for entity in &mut entities {
        ensure_system_fields(entity);
    }

    let mut pages = doc.pages;
    ensure_required_pages(&mut pages, &entities);

    for page in &pages {
        if !entities.iter().any(|e| e.name == page.entity) {
            warn!(page = %page.name, entity = %page.entity, "page references unknown entity");
        }
    }
    for policy in &doc.policies {
        if !entities.iter().any(|e| e.name == policy.entity) {
            warn!(policy = %policy.name, entity = %policy.entity, "policy references unknown entity");
        }
    }

    let schema = Schema {
        name: doc.name.unwrap_or_else(|| UNTITLED_APP.to_string()),
        description: doc.description,
        entities,
        pages,
        policies: doc.policies,
        version: doc
            .version
            .unwrap_or_else(|| appgen_ir::DEFAULT_VERSION.to_string()),
        created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    debug!(
        app = %schema.name,
        entities = schema.entities.len(),
        pages = schema.pages.len(),
        "normalized schema"
    );
    Ok(schema)
}

/// Enforce the `id` / `created_at` / `updated_at` invariants.
///
/// `id` is coerced in place or injected first; timestamps are coerced in
/// place or appended. Other fields keep their order.
fn ensure_system_fields(entity: &mut Entity) {
    match entity.columns.iter_mut().find(|f| f.name == ID_FIELD) {
        Some(id) => {
            let canonical = Field::canonical_id();
            if *id != canonical {
                debug!(entity = %entity.name, "coerced id field");
                *id = canonical;
            }
        }
        None => {
            debug!(entity = %entity.name, "injected id field");
            entity.columns.insert(0, Field::canonical_id());
        }
    }

    for name in [CREATED_AT_FIELD, UPDATED_AT_FIELD] {
        let canonical = Field::canonical_timestamp(name);
        match entity.columns.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                if *field != canonical {
                    debug!(entity = %entity.name, field = name, "coerced timestamp field");
                    *field = canonical;
                }
            }
            None => {
                debug!(entity = %entity.name, field = name, "appended timestamp field");
                entity.columns.push(canonical);
            }
        }
    }
}

/// Append a list/form/detail page for every entity missing one.
fn ensure_required_pages(pages: &mut Vec<Page>, entities: &[Entity]) {
    for entity in entities {
        for kind in PageKind::REQUIRED {
            let present = pages
                .iter()
                .any(|p| p.entity == entity.name && p.kind == kind);
            if present {
                continue;
            }
            let label = entity.label();
            debug!(entity = %entity.name, page = %kind, "synthesized page");
            pages.push(Page {
                name: format!("{}-{}", entity.name, kind),
                kind,
                entity: entity.name.clone(),
                title: Some(format!("{} {}", label, kind.label())),
                description: Some(format!("{} {} page", label, kind.as_str())),
            });
        }
    }
}
