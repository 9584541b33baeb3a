/// Backend scaffold generator: an axum service with one in-memory store per entity.
///
/// Output tree (relative to the backend root):
///
/// ```text
/// Cargo.toml
/// src/main.rs            router composition + root descriptor
/// src/error.rs           ApiError → HTTP response
/// src/store.rs           MemoryStore<T>
/// src/models/mod.rs
/// src/models/<entity>.rs Base / Create / Update / full shape
/// src/routes/mod.rs      shared pagination query
/// src/routes/<entity>.rs list / get / create / update / delete
/// ```

use appgen_ir::{naming, Entity, Field, Schema, SERVICE_TYPES};
use tracing::debug;

use crate::{CodeWriter, GeneratedCode, Result};

/// Listen address baked into the generated `main.rs`.
pub const LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Default page size of the generated list endpoints.
pub const DEFAULT_LIMIT: usize = 100;

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED_IDENTS: &[&str] = &["self", "Self", "super", "crate", "_"];

pub struct BackendGenerator;

impl crate::Codegen for BackendGenerator {
    fn generate(&self, schema: &Schema) -> Result<GeneratedCode> {
        emit_backend(schema)
    }

    fn language(&self) -> &str {
        "rust-axum"
    }
}

/// Emit the backend tree for every entity in the schema.
pub fn emit_backend(schema: &Schema) -> Result<GeneratedCode> {
    let mut code = GeneratedCode::new();

    code.push("Cargo.toml", cargo_manifest(schema));
    code.push("src/main.rs", main_rs(schema));
    code.push("src/error.rs", error_rs());
    code.push("src/store.rs", store_rs());
    code.push("src/models/mod.rs", mod_list(schema));
    code.push("src/routes/mod.rs", routes_mod_rs(schema));

    for entity in &schema.entities {
        let module = entity.module_name();
        code.push(format!("src/models/{module}.rs"), model_rs(entity)?);
        code.push(format!("src/routes/{module}.rs"), routes_rs(entity));
        debug!(entity = %entity.name, mount = %entity.route_path(), "emitted backend entity");
    }

    Ok(code)
}

// ── Identifiers ──

/// A user field as it appears in generated Rust.
struct RustField<'a> {
    ident: String,
    /// Original name when the identifier differs from the JSON key.
    rename: Option<&'a str>,
    ty: &'static str,
    required: bool,
}

impl<'a> RustField<'a> {
    fn new(field: &'a Field) -> Result<Self> {
        let (ident, plain) = rust_ident(&field.name);
        Ok(Self {
            ident,
            rename: (plain != field.name).then_some(field.name.as_str()),
            ty: SERVICE_TYPES.lookup(field.ty)?,
            required: field.required,
        })
    }

    fn write_serde_attr(&self, w: &mut CodeWriter) {
        if let Some(name) = self.rename {
            w.line(format!("#[serde(rename = {name:?})]"));
        }
    }
}

/// Returns the identifier to emit and the plain snake_case name it stands for.
fn rust_ident(name: &str) -> (String, String) {
    let mut plain: String = naming::snake_case(name)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if plain.is_empty() || plain.starts_with(|c: char| c.is_ascii_digit()) {
        plain.insert_str(0, "f_");
    }

    let ident = if RESERVED_IDENTS.contains(&plain.as_str()) {
        format!("{plain}_")
    } else if RUST_KEYWORDS.contains(&plain.as_str()) {
        format!("r#{plain}")
    } else {
        plain.clone()
    };
    // serde strips `r#`, so a raw keyword still serializes under its own name
    let plain = ident.trim_start_matches("r#").to_string();
    (ident, plain)
}

/// Package (and binary) name of the generated backend crate.
pub(crate) fn crate_name(schema: &Schema) -> String {
    let slug: String = schema
        .slug()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if slug.is_empty() || slug.starts_with(|c: char| c.is_ascii_digit()) {
        format!("app{slug}-backend")
    } else {
        format!("{slug}-backend")
    }
}

// ── Crate-level files ──

fn cargo_manifest(schema: &Schema) -> String {
    let mut w = CodeWriter::new();
    w.line("[package]");
    w.line(format!("name = \"{}\"", crate_name(schema)));
    w.line(format!("version = {:?}", schema.version));
    w.line("edition = \"2021\"");
    w.line("publish = false");
    w.blank();
    w.line("[dependencies]");
    w.lines([
        "axum = \"0.8\"",
        "chrono = { version = \"0.4\", features = [\"serde\"] }",
        "serde = { version = \"1.0\", features = [\"derive\"] }",
        "serde_json = \"1.0\"",
        "tokio = { version = \"1\", features = [\"full\"] }",
        "tower-http = { version = \"0.6\", features = [\"cors\"] }",
        "uuid = { version = \"1\", features = [\"v4\"] }",
    ]);
    w.finish()
}

fn main_rs(schema: &Schema) -> String {
    let mut w = CodeWriter::new();
    w.line(format!("//! {} API", schema.name));
    if let Some(desc) = &schema.description {
        w.line("//!");
        for line in desc.lines() {
            w.line(format!("//! {line}").trim_end());
        }
    }
    w.line("//!");
    w.line(format!("//! Generated by appgen at {}.", schema.created_at));
    w.blank();
    w.lines(["mod error;", "mod models;", "mod routes;", "mod store;"]);
    w.blank();
    w.line("use axum::{routing::get, Json, Router};");
    w.line("use serde_json::{json, Value};");
    w.line("use tower_http::cors::CorsLayer;");
    w.blank();

    w.line("#[tokio::main]");
    w.block("async fn main() {", "}", |w| {
        w.line("let app = Router::new()");
        w.indent();
        w.line(".route(\"/\", get(root))");
        for entity in &schema.entities {
            w.line(format!(
                ".nest({:?}, routes::{}::router())",
                entity.route_path(),
                entity.module_name()
            ));
        }
        w.line(".layer(CorsLayer::permissive());");
        w.dedent();
        w.blank();
        w.line("let listener = tokio::net::TcpListener::bind(ADDR)");
        w.indent().line(".await").line(".expect(\"failed to bind listen address\");").dedent();
        w.line("println!(\"listening on http://{ADDR}\");");
        w.line("axum::serve(listener, app).await.expect(\"server error\");");
    });
    w.blank();
    w.line(format!("const ADDR: &str = {LISTEN_ADDR:?};"));
    w.blank();

    w.block("async fn root() -> Json<Value> {", "}", |w| {
        w.block("Json(json!({", "}))", |w| {
            w.line(format!("\"message\": {:?},", format!("Welcome to {}", schema.name)));
            w.line(format!(
                "\"description\": {:?},",
                schema.description.as_deref().unwrap_or("")
            ));
            w.line(format!("\"version\": {:?},", schema.version));
            let endpoints: Vec<String> = schema
                .entities
                .iter()
                .map(|e| format!("{:?}", e.route_path()))
                .collect();
            w.line(format!("\"endpoints\": [{}],", endpoints.join(", ")));
        });
    });
    w.finish()
}

fn error_rs() -> String {
    let mut w = CodeWriter::new();
    w.line("use axum::{");
    w.indent()
        .line("http::StatusCode,")
        .line("response::{IntoResponse, Response},")
        .line("Json,")
        .dedent();
    w.line("};");
    w.line("use serde_json::json;");
    w.blank();
    w.line("#[derive(Debug)]");
    w.block("pub enum ApiError {", "}", |w| {
        w.line("/// No record with the requested id; carries the type name.");
        w.line("NotFound(&'static str),");
    });
    w.blank();
    w.block("impl IntoResponse for ApiError {", "}", |w| {
        w.block("fn into_response(self) -> Response {", "}", |w| {
            w.block("match self {", "}", |w| {
                w.line("ApiError::NotFound(what) => (");
                w.indent()
                    .line("StatusCode::NOT_FOUND,")
                    .line("Json(json!({ \"detail\": format!(\"{what} not found\") })),")
                    .dedent();
                w.line(")");
                w.indent().line(".into_response(),").dedent();
            });
        });
    });
    w.finish()
}

fn store_rs() -> String {
    let mut w = CodeWriter::new();
    w.line("use std::collections::HashMap;");
    w.line("use std::sync::RwLock;");
    w.blank();
    w.line("/// Unordered in-process collection keyed by record id.");
    w.block("pub struct MemoryStore<T> {", "}", |w| {
        w.line("items: RwLock<HashMap<String, T>>,");
    });
    w.blank();
    w.block("impl<T: Clone> MemoryStore<T> {", "}", |w| {
        w.block("pub fn new() -> Self {", "}", |w| {
            w.block("Self {", "}", |w| {
                w.line("items: RwLock::new(HashMap::new()),");
            });
        });
        w.blank();
        w.block("pub fn list(&self) -> Vec<T> {", "}", |w| {
            w.line("self.read().values().cloned().collect()");
        });
        w.blank();
        w.block("pub fn get(&self, id: &str) -> Option<T> {", "}", |w| {
            w.line("self.read().get(id).cloned()");
        });
        w.blank();
        w.block("pub fn insert(&self, id: String, item: T) {", "}", |w| {
            w.line("self.write().insert(id, item);");
        });
        w.blank();
        w.line("/// Apply `f` to the stored record and return the result, or `None` if absent.");
        w.block(
            "pub fn update(&self, id: &str, f: impl FnOnce(&mut T)) -> Option<T> {",
            "}",
            |w| {
                w.line("let mut items = self.write();");
                w.line("let item = items.get_mut(id)?;");
                w.line("f(item);");
                w.line("Some(item.clone())");
            },
        );
        w.blank();
        w.block("pub fn remove(&self, id: &str) -> Option<T> {", "}", |w| {
            w.line("self.write().remove(id)");
        });
        w.blank();
        w.block(
            "fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, T>> {",
            "}",
            |w| {
                w.line("self.items.read().unwrap_or_else(|e| e.into_inner())");
            },
        );
        w.blank();
        w.block(
            "fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, T>> {",
            "}",
            |w| {
                w.line("self.items.write().unwrap_or_else(|e| e.into_inner())");
            },
        );
    });
    w.blank();
    w.block("impl<T: Clone> Default for MemoryStore<T> {", "}", |w| {
        w.block("fn default() -> Self {", "}", |w| {
            w.line("Self::new()");
        });
    });
    w.finish()
}

fn mod_list(schema: &Schema) -> String {
    let mut w = CodeWriter::new();
    for entity in &schema.entities {
        w.line(format!("pub mod {};", entity.module_name()));
    }
    w.finish()
}

fn routes_mod_rs(schema: &Schema) -> String {
    let mut w = CodeWriter::new();
    for entity in &schema.entities {
        w.line(format!("pub mod {};", entity.module_name()));
    }
    if !schema.entities.is_empty() {
        w.blank();
    }
    w.line("use serde::Deserialize;");
    w.blank();
    w.line(format!(
        "/// `?offset=&limit=` for list endpoints; defaults to the first {DEFAULT_LIMIT} records."
    ));
    w.line("#[derive(Debug, Deserialize)]");
    w.block("pub struct Pagination {", "}", |w| {
        w.line("#[serde(default)]");
        w.line("pub offset: usize,");
        w.line("#[serde(default = \"default_limit\")]");
        w.line("pub limit: usize,");
    });
    w.blank();
    w.block("fn default_limit() -> usize {", "}", |w| {
        w.line(DEFAULT_LIMIT.to_string());
    });
    w.finish()
}

// ── Per-entity files ──

fn model_rs(entity: &Entity) -> Result<String> {
    let ty = entity.type_name();
    let fields = entity
        .user_fields()
        .map(RustField::new)
        .collect::<Result<Vec<_>>>()?;

    let mut w = CodeWriter::new();
    w.line(format!("//! {} models.", entity.label()));
    w.blank();
    w.line("use chrono::{DateTime, Utc};");
    w.line("use serde::{Deserialize, Serialize};");
    w.blank();

    w.line("/// Fields supplied by clients.");
    w.line("#[derive(Debug, Clone, Serialize, Deserialize)]");
    w.block(format!("pub struct {ty}Base {{"), "}", |w| {
        for f in &fields {
            f.write_serde_attr(w);
            if f.required {
                w.line(format!("pub {}: {},", f.ident, f.ty));
            } else {
                w.line(format!("pub {}: Option<{}>,", f.ident, f.ty));
            }
        }
    });
    w.blank();
    w.line(format!("pub type {ty}Create = {ty}Base;"));
    w.blank();

    w.line("/// Partial update: only the supplied fields are changed.");
    w.line("#[derive(Debug, Clone, Default, Deserialize)]");
    w.block(format!("pub struct {ty}Update {{"), "}", |w| {
        for f in &fields {
            f.write_serde_attr(w);
            w.line(format!("pub {}: Option<{}>,", f.ident, f.ty));
        }
    });
    w.blank();

    w.line("#[derive(Debug, Clone, Serialize, Deserialize)]");
    w.block(format!("pub struct {ty} {{"), "}", |w| {
        w.line("pub id: String,");
        w.line("#[serde(flatten)]");
        w.line(format!("pub base: {ty}Base,"));
        w.line("pub created_at: DateTime<Utc>,");
        w.line("pub updated_at: DateTime<Utc>,");
    });
    w.blank();

    w.block(format!("impl {ty} {{"), "}", |w| {
        w.line("/// New record with a server-generated id and timestamps.");
        w.block(format!("pub fn new(base: {ty}Create) -> Self {{"), "}", |w| {
            w.line("let now = Utc::now();");
            w.block("Self {", "}", |w| {
                w.line("id: uuid::Uuid::new_v4().to_string(),");
                w.line("base,");
                w.line("created_at: now,");
                w.line("updated_at: now,");
            });
        });
        w.blank();
        w.line("/// Merge supplied fields and re-stamp `updated_at`.");
        w.block(
            format!("pub fn apply(&mut self, update: {ty}Update) {{"),
            "}",
            |w| {
                for f in &fields {
                    let target = if f.required {
                        "value".to_string()
                    } else {
                        "Some(value)".to_string()
                    };
                    w.block(
                        format!("if let Some(value) = update.{} {{", f.ident),
                        "}",
                        |w| {
                            w.line(format!("self.base.{} = {target};", f.ident));
                        },
                    );
                }
                if fields.is_empty() {
                    w.line("let _ = update;");
                }
                w.line("self.updated_at = Utc::now();");
            },
        );
    });
    Ok(w.finish())
}

fn routes_rs(entity: &Entity) -> String {
    let ty = entity.type_name();
    let module = entity.module_name();

    let mut w = CodeWriter::new();
    w.line(format!("//! `{}` endpoints.", entity.route_path()));
    w.blank();
    w.line("use std::sync::Arc;");
    w.blank();
    w.line("use axum::{");
    w.indent()
        .line("extract::{Path, Query, State},")
        .line("http::StatusCode,")
        .line("routing::get,")
        .line("Json, Router,")
        .dedent();
    w.line("};");
    w.line("use serde_json::{json, Value};");
    w.blank();
    w.line("use super::Pagination;");
    w.line("use crate::error::ApiError;");
    w.line(format!(
        "use crate::models::{module}::{{{ty}, {ty}Create, {ty}Update}};"
    ));
    w.line("use crate::store::MemoryStore;");
    w.blank();
    w.line(format!("type Store = Arc<MemoryStore<{ty}>>;"));
    w.blank();

    w.block("pub fn router() -> Router {", "}", |w| {
        w.line("Router::new()");
        w.indent();
        w.line(format!(
            ".route(\"/\", get(list_{module}).post(create_{module}))"
        ));
        w.line(format!(
            ".route(\"/{{id}}\", get(get_{module}).put(update_{module}).delete(delete_{module}))"
        ));
        w.line(".with_state(Arc::new(MemoryStore::new()))");
        w.dedent();
    });
    w.blank();

    w.block(
        format!("async fn list_{module}(State(store): State<Store>, Query(page): Query<Pagination>) -> Json<Vec<{ty}>> {{"),
        "}",
        |w| {
            w.line("let mut items = store.list();");
            w.line("items.sort_by(|a, b| a.created_at.cmp(&b.created_at));");
            w.line("Json(items.into_iter().skip(page.offset).take(page.limit).collect())");
        },
    );
    w.blank();

    w.block(
        format!("async fn get_{module}(State(store): State<Store>, Path(id): Path<String>) -> Result<Json<{ty}>, ApiError> {{"),
        "}",
        |w| {
            w.line(format!("store.get(&id).map(Json).ok_or(ApiError::NotFound({ty:?}))"));
        },
    );
    w.blank();

    w.block(
        format!("async fn create_{module}(State(store): State<Store>, Json(body): Json<{ty}Create>) -> (StatusCode, Json<{ty}>) {{"),
        "}",
        |w| {
            w.line(format!("let item = {ty}::new(body);"));
            w.line("store.insert(item.id.clone(), item.clone());");
            w.line("(StatusCode::CREATED, Json(item))");
        },
    );
    w.blank();

    w.block(
        format!("async fn update_{module}(State(store): State<Store>, Path(id): Path<String>, Json(body): Json<{ty}Update>) -> Result<Json<{ty}>, ApiError> {{"),
        "}",
        |w| {
            w.line("store");
            w.indent()
                .line(".update(&id, |item| item.apply(body))")
                .line(".map(Json)")
                .line(format!(".ok_or(ApiError::NotFound({ty:?}))"))
                .dedent();
        },
    );
    w.blank();

    w.block(
        format!("async fn delete_{module}(State(store): State<Store>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {{"),
        "}",
        |w| {
            w.line("store");
            w.indent()
                .line(".remove(&id)")
                .line(format!(
                    ".map(|_| Json(json!({{ \"message\": \"{ty} deleted successfully\" }})))"
                ))
                .line(format!(".ok_or(ApiError::NotFound({ty:?}))"))
                .dedent();
        },
    );
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use appgen_ir::{FieldType, CREATED_AT_FIELD, UPDATED_AT_FIELD};

    fn schema(entities: Vec<Entity>) -> Schema {
        Schema {
            name: "Blog".into(),
            description: Some("A small blog".into()),
            entities,
            pages: vec![],
            policies: vec![],
            version: "1.0.0".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    fn with_system_fields(name: &str, mut user: Vec<Field>) -> Entity {
        let mut columns = vec![Field::canonical_id()];
        columns.append(&mut user);
        columns.push(Field::canonical_timestamp(CREATED_AT_FIELD));
        columns.push(Field::canonical_timestamp(UPDATED_AT_FIELD));
        Entity::new(name, columns)
    }

    fn post() -> Entity {
        with_system_fields(
            "post",
            vec![
                Field::new("title", FieldType::Text).required(),
                Field::new("views", FieldType::Number),
                Field::new("published", FieldType::Boolean),
            ],
        )
    }

    #[test]
    fn tree_layout() {
        let code = emit_backend(&schema(vec![post(), with_system_fields("paymentRecord", vec![])])).unwrap();
        let paths: Vec<&str> = code.paths().collect();
        assert_eq!(
            paths,
            vec![
                "Cargo.toml",
                "src/main.rs",
                "src/error.rs",
                "src/store.rs",
                "src/models/mod.rs",
                "src/routes/mod.rs",
                "src/models/post.rs",
                "src/routes/post.rs",
                "src/models/payment_record.rs",
                "src/routes/payment_record.rs",
            ]
        );
        let models_mod = &code.file("src/models/mod.rs").unwrap().content;
        assert_eq!(models_mod, "pub mod post;\npub mod payment_record;\n");
    }

    #[test]
    fn main_mounts_pluralized_routes() {
        let code = emit_backend(&schema(vec![post(), with_system_fields("paymentRecord", vec![])])).unwrap();
        let main = &code.file("src/main.rs").unwrap().content;
        assert!(main.contains(".nest(\"/posts\", routes::post::router())"));
        assert!(main.contains(".nest(\"/paymentRecords\", routes::payment_record::router())"));
        assert!(main.contains("\"endpoints\": [\"/posts\", \"/paymentRecords\"],"));
        assert!(main.contains("const ADDR: &str = \"0.0.0.0:8000\";"));
        assert!(main.contains("CorsLayer::permissive()"));
    }

    #[test]
    fn model_shapes() {
        let model = model_rs(&post()).unwrap();
        assert!(model.contains("pub struct PostBase {\n    pub title: String,\n    pub views: Option<f64>,\n    pub published: Option<bool>,\n}"));
        assert!(model.contains("pub type PostCreate = PostBase;"));
        assert!(model.contains("pub struct PostUpdate {\n    pub title: Option<String>,\n    pub views: Option<f64>,\n    pub published: Option<bool>,\n}"));
        assert!(model.contains("    #[serde(flatten)]\n    pub base: PostBase,"));
        assert!(model.contains("self.base.title = value;"));
        assert!(model.contains("self.base.views = Some(value);"));
        // system fields only on the full shape
        assert_eq!(model.matches("pub created_at").count(), 1);
    }

    #[test]
    fn keyword_and_camel_case_fields() {
        let entity = with_system_fields(
            "item",
            vec![
                Field::new("type", FieldType::Text),
                Field::new("dueDate", FieldType::Date).required(),
                Field::new("self", FieldType::Text),
            ],
        );
        let model = model_rs(&entity).unwrap();
        assert!(model.contains("pub r#type: Option<String>,"));
        assert!(!model.contains("rename = \"type\""));
        assert!(model.contains("#[serde(rename = \"dueDate\")]\n    pub due_date: DateTime<Utc>,"));
        assert!(model.contains("#[serde(rename = \"self\")]\n    pub self_: Option<String>,"));
    }

    #[test]
    fn routes_cover_five_operations() {
        let routes = routes_rs(&post());
        assert!(routes.contains(".route(\"/\", get(list_post).post(create_post))"));
        assert!(routes.contains(".route(\"/{id}\", get(get_post).put(update_post).delete(delete_post))"));
        assert!(routes.contains("ApiError::NotFound(\"Post\")"));
        assert!(routes.contains("\"Post deleted successfully\""));
        assert!(routes.contains(".skip(page.offset).take(page.limit)"));
    }

    #[test]
    fn pagination_defaults() {
        let code = emit_backend(&schema(vec![post()])).unwrap();
        let m = &code.file("src/routes/mod.rs").unwrap().content;
        assert!(m.starts_with("pub mod post;\n\n"));
        assert!(m.contains("fn default_limit() -> usize {\n    100\n}"));
    }

    #[test]
    fn not_found_detail_shape() {
        assert!(error_rs().contains("\"detail\": format!(\"{what} not found\")"));
    }

    #[test]
    fn crate_name_from_app_name() {
        let mut s = schema(vec![]);
        s.name = "My Blog".into();
        assert_eq!(crate_name(&s), "my-blog-backend");
        s.name = "2048 Game!".into();
        assert_eq!(crate_name(&s), "app2048-game-backend");
    }
}
