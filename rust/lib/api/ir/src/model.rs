//! Schema IR documents — the shape persisted as `dsl.json`.

use serde::{Deserialize, Serialize};

use crate::naming;
use crate::types::{FieldType, PageKind, PolicyAction};

/// Primary key field every entity carries.
pub const ID_FIELD: &str = "id";
/// Creation timestamp field every entity carries.
pub const CREATED_AT_FIELD: &str = "created_at";
/// Last-update timestamp field every entity carries.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Fields managed by the generator rather than the user.
pub const SYSTEM_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Version stamped on documents that don't declare one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// A typed, named attribute of an entity (one table column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub primary_key: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            unique: false,
            primary_key: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Canonical `id` field: text, primary key, required, unique.
    pub fn canonical_id() -> Self {
        Field::new(ID_FIELD, FieldType::Text)
            .primary_key()
            .required()
            .unique()
    }

    /// Canonical timestamp field: date, required.
    pub fn canonical_timestamp(name: &str) -> Self {
        Field::new(name, FieldType::Date).required()
    }

    /// True for `id`, `created_at` and `updated_at`.
    pub fn is_system(&self) -> bool {
        SYSTEM_FIELDS.contains(&self.name.as_str())
    }
}

/// One application concept: one table, one model set, one view set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Singular identifier (e.g. `post`).
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub columns: Vec<Field>,
}

impl Entity {
    pub fn new(name: impl Into<String>, columns: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            columns,
        }
    }

    /// Human label: display name when set, otherwise the identifier.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Type name used by the generated code (`post` → `Post`).
    pub fn type_name(&self) -> String {
        naming::type_name(&self.name)
    }

    /// Module/file stem for generated Rust code (`paymentRecord` → `payment_record`).
    pub fn module_name(&self) -> String {
        naming::snake_case(&self.name)
    }

    /// URL segment shared by backend routes and frontend clients (`post` → `posts`).
    pub fn route_segment(&self) -> String {
        naming::pluralize(&self.name)
    }

    /// URL path shared by backend routes and frontend clients (`post` → `/posts`).
    pub fn route_path(&self) -> String {
        format!("/{}", self.route_segment())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.columns.iter().find(|f| f.name == name)
    }

    /// Fields the user declared, i.e. everything except the system fields.
    pub fn user_fields(&self) -> impl Iterator<Item = &Field> {
        self.columns.iter().filter(|f| !f.is_system())
    }

    /// Fields forming the primary key, in declaration order.
    pub fn primary_key_fields(&self) -> impl Iterator<Item = &Field> {
        self.columns.iter().filter(|f| f.primary_key)
    }
}

/// A UI page bound to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: PageKind,

    pub entity: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Access rule attached to an entity. Carried through, not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub entity: String,
    pub action: PolicyAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Root of the IR: the whole application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub entities: Vec<Entity>,

    #[serde(default)]
    pub pages: Vec<Page>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<Policy>,

    pub version: String,

    /// RFC 3339 timestamp stamped by the normalizer.
    pub created_at: String,
}

impl Schema {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Pages bound to the given entity, in document order.
    pub fn pages_for<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages.iter().filter(move |p| p.entity == entity)
    }

    /// First page of the given kind for an entity.
    pub fn page<'a>(&'a self, entity: &str, kind: PageKind) -> Option<&'a Page> {
        self.pages.iter().find(|p| p.entity == entity && p.kind == kind)
    }

    pub fn policies_for<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Policy> + 'a {
        self.policies.iter().filter(move |p| p.entity == entity)
    }

    /// URL-safe application slug (`My Blog` → `my-blog`).
    pub fn slug(&self) -> String {
        naming::slug(&self.name, '-')
    }

    /// Database identifier derived from the application name (`My Blog` → `my_blog`).
    pub fn database_name(&self) -> String {
        naming::slug(&self.name, '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Entity {
        Entity {
            name: "post".into(),
            display_name: Some("Blog Post".into()),
            columns: vec![
                Field::canonical_id(),
                Field::new("title", FieldType::Text).required(),
                Field::canonical_timestamp(CREATED_AT_FIELD),
                Field::canonical_timestamp(UPDATED_AT_FIELD),
            ],
        }
    }

    #[test]
    fn entity_naming() {
        let e = post();
        assert_eq!(e.type_name(), "Post");
        assert_eq!(e.route_segment(), "posts");
        assert_eq!(e.route_path(), "/posts");
        assert_eq!(e.label(), "Blog Post");
    }

    #[test]
    fn user_fields_skip_system_fields() {
        let e = post();
        let names: Vec<&str> = e.user_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title"]);
        let pk: Vec<&str> = e.primary_key_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(pk, vec!["id"]);
    }

    #[test]
    fn field_serializes_with_document_keys() {
        let json = serde_json::to_value(Field::canonical_id()).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["primaryKey"], true);
        assert_eq!(json["required"], true);
        assert!(json.get("primary_key").is_none());
    }

    #[test]
    fn schema_serializes_camel_case_and_skips_empty_policies() {
        let schema = Schema {
            name: "Blog".into(),
            description: None,
            entities: vec![post()],
            pages: vec![],
            policies: vec![],
            version: DEFAULT_VERSION.into(),
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["entities"][0]["displayName"], "Blog Post");
        assert!(json.get("policies").is_none());
        assert!(json.get("description").is_none());

        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn page_lookups_by_entity_and_kind() {
        let page = |name: &str, kind: PageKind, entity: &str| Page {
            name: name.into(),
            kind,
            entity: entity.into(),
            title: None,
            description: None,
        };
        let schema = Schema {
            name: "Blog".into(),
            description: None,
            entities: vec![post()],
            pages: vec![
                page("post-list", PageKind::List, "post"),
                page("tag-list", PageKind::List, "tag"),
                page("post-detail", PageKind::Detail, "post"),
                page("post-list-2", PageKind::List, "post"),
            ],
            policies: vec![],
            version: DEFAULT_VERSION.into(),
            created_at: "2026-01-01T00:00:00Z".into(),
        };

        let names: Vec<&str> = schema.pages_for("post").map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["post-list", "post-detail", "post-list-2"]);

        // the returned page outlives the key it was looked up with
        let found = {
            let key = String::from("post");
            schema.page(&key, PageKind::List).map(|p| p.name.as_str())
        };
        assert_eq!(found, Some("post-list"));
        assert_eq!(schema.page("post", PageKind::Form), None);
        assert_eq!(schema.page("tag", PageKind::List).map(|p| p.name.as_str()), Some("tag-list"));
    }
}
