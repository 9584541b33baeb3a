/// PostgreSQL migration / rollback generator

use appgen_ir::{
    Entity, Field, FieldType, Schema, CREATED_AT_FIELD, ID_FIELD, SQL_TYPES, UPDATED_AT_FIELD,
};
use tracing::debug;

use crate::{CodeWriter, GeneratedCode, Result};

/// Namespace that needs no `CREATE SCHEMA` and no table prefix.
pub const DEFAULT_NAMESPACE: &str = "public";

/// Field names that always get an index (unless primary or unique).
pub const SEARCH_FIELDS: [&str; 5] = ["name", "title", "status", "type", "category"];

pub struct SqlGenerator {
    pub namespace: String,
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl SqlGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl crate::Codegen for SqlGenerator {
    fn generate(&self, schema: &Schema) -> Result<GeneratedCode> {
        let mut code = GeneratedCode::new();
        code.push("migration.sql", emit_schema(schema, &self.namespace)?);
        code.push("rollback.sql", emit_rollback(schema, &self.namespace));
        Ok(code)
    }

    fn language(&self) -> &str {
        "sql"
    }
}

/// DDL for every entity: tables in IR order, then indexes, then a footer.
pub fn emit_schema(schema: &Schema, namespace: &str) -> Result<String> {
    let mut w = CodeWriter::new();

    if namespace != DEFAULT_NAMESPACE {
        w.line(format!("CREATE SCHEMA IF NOT EXISTS {namespace};"));
        w.blank();
    }

    for entity in &schema.entities {
        create_table(&mut w, entity, namespace)?;
        w.blank();
    }

    for entity in &schema.entities {
        let indexes: Vec<String> = entity
            .columns
            .iter()
            .filter(|f| should_index(f))
            .map(|f| {
                format!(
                    "CREATE INDEX idx_{}_{} ON {} ({});",
                    entity.name,
                    f.name,
                    table_name(entity, namespace),
                    f.name
                )
            })
            .collect();
        if !indexes.is_empty() {
            w.lines(&indexes);
            w.blank();
        }
    }

    w.line("-- Application");
    w.line(format!("-- Name: {}", schema.name));
    w.line(format!(
        "-- Description: {}",
        schema.description.as_deref().unwrap_or("none")
    ));
    w.line(format!("-- Generated at: {}", schema.created_at));
    w.line(format!("-- Schema version: {}", schema.version));

    debug!(tables = schema.entities.len(), namespace, "emitted migration");
    Ok(w.finish())
}

/// `DROP TABLE` in reverse creation order, then the namespace.
pub fn emit_rollback(schema: &Schema, namespace: &str) -> String {
    let mut w = CodeWriter::new();
    for entity in schema.entities.iter().rev() {
        w.line(format!(
            "DROP TABLE IF EXISTS {} CASCADE;",
            table_name(entity, namespace)
        ));
    }
    if namespace != DEFAULT_NAMESPACE {
        w.line(format!("DROP SCHEMA IF EXISTS {namespace} CASCADE;"));
    }
    w.finish()
}

fn table_name(entity: &Entity, namespace: &str) -> String {
    if namespace == DEFAULT_NAMESPACE {
        entity.name.clone()
    } else {
        format!("{namespace}.{}", entity.name)
    }
}

fn create_table(w: &mut CodeWriter, entity: &Entity, namespace: &str) -> Result<()> {
    let mut definitions = Vec::new();
    for field in &entity.columns {
        definitions.push(column_definition(field)?);
    }

    let pk: Vec<&str> = entity.primary_key_fields().map(|f| f.name.as_str()).collect();
    if !pk.is_empty() {
        definitions.push(format!(
            "CONSTRAINT pk_{} PRIMARY KEY ({})",
            entity.name,
            pk.join(", ")
        ));
    }
    for field in entity.columns.iter().filter(|f| f.unique && !f.primary_key) {
        definitions.push(format!(
            "CONSTRAINT uk_{}_{} UNIQUE ({})",
            entity.name, field.name, field.name
        ));
    }

    let last = definitions.len().saturating_sub(1);
    w.block(
        format!("CREATE TABLE {} (", table_name(entity, namespace)),
        ");",
        |w| {
            for (i, def) in definitions.iter().enumerate() {
                if i == last {
                    w.line(def);
                } else {
                    w.line(format!("{def},"));
                }
            }
        },
    );
    Ok(())
}

fn column_definition(field: &Field) -> Result<String> {
    let ty = SQL_TYPES.lookup(field.ty)?;
    let mut def = format!("\"{}\" {}", field.name, ty);
    if let Some(default) = default_value(field) {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def.push_str(if field.required { " NOT NULL" } else { " NULL" });
    Ok(def)
}

fn default_value(field: &Field) -> Option<&'static str> {
    if field.name == ID_FIELD && field.primary_key {
        Some("gen_random_uuid()")
    } else if field.name == CREATED_AT_FIELD || field.name == UPDATED_AT_FIELD {
        Some("CURRENT_TIMESTAMP")
    } else if field.ty == FieldType::Boolean {
        Some("FALSE")
    } else {
        None
    }
}

/// Index heuristic: email/date columns and well-known search fields.
/// Primary and unique columns are already indexed by their constraints.
fn should_index(field: &Field) -> bool {
    if field.primary_key || field.unique {
        return false;
    }
    matches!(field.ty, FieldType::Email | FieldType::Date)
        || SEARCH_FIELDS.contains(&field.name.as_str())
}
