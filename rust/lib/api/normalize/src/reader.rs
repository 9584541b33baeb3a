//! Structural read of a raw schema document.
//!
//! Walks the whole document and records every problem with its path before
//! giving up, so a caller sees all of them at once.

use std::collections::HashSet;
use std::fmt;

use appgen_ir::{Entity, Field, FieldType, Page, PageKind, Policy, PolicyAction};
use serde_json::{Map, Value};

use crate::NormalizeError;

/// One problem found in a raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralIssue {
    /// Location in the document, e.g. `entities[0].columns[2].type`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Document content that survived the structural read.
pub(crate) struct RawDocument {
    pub name: Option<String>,
    pub description: Option<String>,
    pub entities: Vec<Entity>,
    pub pages: Vec<Page>,
    pub policies: Vec<Policy>,
    pub version: Option<String>,
}

#[derive(Default)]
struct Issues(Vec<StructuralIssue>);

impl Issues {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(StructuralIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn opt_string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(join(path, key), "expected a string");
                None
            }
        }
    }

    fn req_string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.push(join(path, key), "missing");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.push(join(path, key), "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(join(path, key), "expected a string");
                None
            }
        }
    }

    fn opt_bool(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> bool {
        match obj.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.push(join(path, key), "expected a boolean");
                false
            }
        }
    }

    /// Absent or null sequences read as empty.
    fn opt_seq<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> &'a [Value] {
        match obj.get(key) {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.push(join(path, key), "expected a sequence");
                &[]
            }
        }
    }
}

/// Entity names become table, module and route names: `[a-z][a-z0-9_]*`.
fn is_entity_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

pub(crate) fn read_document(raw: &Value) -> Result<RawDocument, NormalizeError> {
    let mut issues = Issues::default();

    let Some(root) = raw.as_object() else {
        issues.push("$", "expected a mapping at the document root");
        return Err(NormalizeError::Structural { issues: issues.0 });
    };

    let name = issues.opt_string(root, "name", "");
    let description = issues.opt_string(root, "description", "");
    let version = issues.opt_string(root, "version", "");

    let entities = match root.get("entities") {
        None | Some(Value::Null) => {
            issues.push("entities", "missing");
            Vec::new()
        }
        Some(Value::Array(items)) => {
            let mut seen = HashSet::new();
            let mut entities = Vec::new();
            for (i, v) in items.iter().enumerate() {
                let entity_path = format!("entities[{i}]");
                if let Some(entity) = read_entity(v, &entity_path, &mut issues) {
                    if !seen.insert(entity.name.clone()) {
                        issues.push(
                            format!("{entity_path}.name"),
                            format!("duplicate entity name '{}'", entity.name),
                        );
                        continue;
                    }
                    entities.push(entity);
                }
            }
            entities
        }
        Some(_) => {
            issues.push("entities", "expected a sequence");
            Vec::new()
        }
    };

    let pages = issues
        .opt_seq(root, "pages", "")
        .iter()
        .enumerate()
        .filter_map(|(i, v)| read_page(v, &format!("pages[{i}]"), &mut issues))
        .collect();

    let policies = issues
        .opt_seq(root, "policies", "")
        .iter()
        .enumerate()
        .filter_map(|(i, v)| read_policy(v, &format!("policies[{i}]"), &mut issues))
        .collect();

    if !issues.0.is_empty() {
        return Err(NormalizeError::Structural { issues: issues.0 });
    }

    Ok(RawDocument {
        name,
        description,
        entities,
        pages,
        policies,
        version,
    })
}

fn read_entity(value: &Value, path: &str, issues: &mut Issues) -> Option<Entity> {
    let Some(obj) = value.as_object() else {
        issues.push(path, "expected a mapping");
        return None;
    };

    let name = match issues.req_string(obj, "name", path) {
        Some(name) if !is_entity_name(&name) => {
            issues.push(
                join(path, "name"),
                format!("'{name}' is not a lowercase identifier"),
            );
            None
        }
        name => name,
    };
    let display_name = issues.opt_string(obj, "displayName", path);

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for (i, v) in issues.opt_seq(obj, "columns", path).iter().enumerate() {
        let field_path = format!("{path}.columns[{i}]");
        if let Some(field) = read_field(v, &field_path, issues) {
            if !seen.insert(field.name.clone()) {
                issues.push(
                    format!("{field_path}.name"),
                    format!("duplicate field name '{}'", field.name),
                );
                continue;
            }
            columns.push(field);
        }
    }

    Some(Entity {
        name: name?,
        display_name,
        columns,
    })
}

fn read_field(value: &Value, path: &str, issues: &mut Issues) -> Option<Field> {
    let Some(obj) = value.as_object() else {
        issues.push(path, "expected a mapping");
        return None;
    };

    let name = issues.req_string(obj, "name", path);
    let ty = issues
        .req_string(obj, "type", path)
        .and_then(|t| match FieldType::from_name(&t) {
            Some(ty) => Some(ty),
            None => {
                issues.push(join(path, "type"), format!("unknown field type '{t}'"));
                None
            }
        });
    let required = issues.opt_bool(obj, "required", path);
    let unique = issues.opt_bool(obj, "unique", path);
    let primary_key = issues.opt_bool(obj, "primaryKey", path);

    Some(Field {
        name: name?,
        ty: ty?,
        required,
        unique,
        primary_key,
    })
}

fn read_page(value: &Value, path: &str, issues: &mut Issues) -> Option<Page> {
    let Some(obj) = value.as_object() else {
        issues.push(path, "expected a mapping");
        return None;
    };

    let name = issues.opt_string(obj, "name", path);
    let kind = issues
        .req_string(obj, "type", path)
        .and_then(|t| match PageKind::from_name(&t) {
            Some(kind) => Some(kind),
            None => {
                issues.push(join(path, "type"), format!("unknown page type '{t}'"));
                None
            }
        });
    let entity = issues.req_string(obj, "entity", path);
    let title = issues.opt_string(obj, "title", path);
    let description = issues.opt_string(obj, "description", path);

    let (kind, entity) = (kind?, entity?);
    Some(Page {
        name: name.unwrap_or_else(|| format!("{entity}-{kind}")),
        kind,
        entity,
        title,
        description,
    })
}

fn read_policy(value: &Value, path: &str, issues: &mut Issues) -> Option<Policy> {
    let Some(obj) = value.as_object() else {
        issues.push(path, "expected a mapping");
        return None;
    };

    let name = issues.req_string(obj, "name", path);
    let entity = issues.req_string(obj, "entity", path);
    let action = issues
        .req_string(obj, "action", path)
        .and_then(|a| match PolicyAction::from_name(&a) {
            Some(action) => Some(action),
            None => {
                issues.push(join(path, "action"), format!("unknown policy action '{a}'"));
                None
            }
        });
    let condition = issues.opt_string(obj, "condition", path);

    Some(Policy {
        name: name?,
        entity: entity?,
        action: action?,
        condition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues_of(raw: Value) -> Vec<String> {
        match read_document(&raw) {
            Ok(_) => Vec::new(),
            Err(e) => e.issues().iter().map(|i| i.to_string()).collect(),
        }
    }

    #[test]
    fn reads_complete_document() {
        let doc = read_document(&json!({
            "name": "CRM",
            "entities": [{"name": "lead", "displayName": "Lead", "columns": [
                {"name": "email", "type": "email", "unique": true, "required": true}
            ]}],
            "pages": [{"type": "kanban", "entity": "lead"}],
            "policies": [{"name": "owner-only", "entity": "lead", "action": "update", "condition": "owner == user"}]
        }))
        .unwrap();
        assert_eq!(doc.name.as_deref(), Some("CRM"));
        assert_eq!(doc.entities[0].columns[0].ty, FieldType::Email);
        assert!(doc.entities[0].columns[0].unique);
        assert_eq!(doc.pages[0].name, "lead-kanban");
        assert_eq!(doc.policies[0].action, PolicyAction::Update);
    }

    #[test]
    fn absent_columns_and_pages_are_empty() {
        let doc = read_document(&json!({"entities": [{"name": "note"}]})).unwrap();
        assert!(doc.entities[0].columns.is_empty());
        assert!(doc.pages.is_empty());
        assert!(doc.name.is_none());
    }

    #[test]
    fn wrong_shapes_are_reported() {
        let issues = issues_of(json!({
            "entities": [
                "task",
                {"name": "a", "columns": {"x": 1}},
                {"name": "b", "columns": [{"name": "done", "type": "boolean", "required": "yes"}]}
            ],
            "pages": {},
            "policies": [{"name": "p", "entity": "b", "action": "approve"}]
        }));
        assert_eq!(
            issues,
            vec![
                "entities[0]: expected a mapping",
                "entities[1].columns: expected a sequence",
                "entities[2].columns[0].required: expected a boolean",
                "pages: expected a sequence",
                "policies[0].action: unknown policy action 'approve'",
            ]
        );
    }

    #[test]
    fn empty_names_are_rejected() {
        let issues = issues_of(json!({"entities": [{"name": "  "}]}));
        assert_eq!(issues, vec!["entities[0].name: must not be empty"]);
    }

    #[test]
    fn entity_names_must_be_lowercase_identifiers() {
        let issues = issues_of(json!({"entities": [
            {"name": "order-item"},
            {"name": "OrderItem"},
            {"name": "2fa_code"},
            {"name": "order_item2"}
        ]}));
        assert_eq!(
            issues,
            vec![
                "entities[0].name: 'order-item' is not a lowercase identifier",
                "entities[1].name: 'OrderItem' is not a lowercase identifier",
                "entities[2].name: '2fa_code' is not a lowercase identifier",
            ]
        );
    }

    #[test]
    fn duplicate_entities_are_rejected() {
        let issues = issues_of(json!({"entities": [
            {"name": "post"},
            {"name": "comment"},
            {"name": "post", "columns": [{"name": "title", "type": "text"}]}
        ]}));
        assert_eq!(issues, vec!["entities[2].name: duplicate entity name 'post'"]);
    }
}
