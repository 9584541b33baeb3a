//! Closed enumerations used across the IR.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of an entity field.
///
/// The set is closed: every value must have a row in each of the
/// [`type_map`](crate::type_map) tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Email,
    Url,
    Textarea,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Date,
        FieldType::Boolean,
        FieldType::Email,
        FieldType::Url,
        FieldType::Textarea,
    ];

    /// Name as it appears in the IR document.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Textarea => "textarea",
        }
    }

    /// Parse a document type name. Returns `None` for anything outside the enumeration.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of page declared for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    List,
    Form,
    Detail,
    Dashboard,
    Kanban,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::List,
        PageKind::Form,
        PageKind::Detail,
        PageKind::Dashboard,
        PageKind::Kanban,
    ];

    /// Page kinds every entity must have after normalization, in synthesis order.
    pub const REQUIRED: [PageKind; 3] = [PageKind::List, PageKind::Form, PageKind::Detail];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::List => "list",
            PageKind::Form => "form",
            PageKind::Detail => "detail",
            PageKind::Dashboard => "dashboard",
            PageKind::Kanban => "kanban",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Capitalized label used in synthesized page titles ("List", "Form", ...).
    pub fn label(&self) -> &'static str {
        match self {
            PageKind::List => "List",
            PageKind::Form => "Form",
            PageKind::Detail => "Detail",
            PageKind::Dashboard => "Dashboard",
            PageKind::Kanban => "Kanban",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action an access policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Create,
    Read,
    Update,
    Delete,
}

impl PolicyAction {
    pub const ALL: [PolicyAction; 4] = [
        PolicyAction::Create,
        PolicyAction::Read,
        PolicyAction::Update,
        PolicyAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Create => "create",
            PolicyAction::Read => "read",
            PolicyAction::Update => "update",
            PolicyAction::Delete => "delete",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_names_roundtrip() {
        for ty in FieldType::ALL {
            assert_eq!(FieldType::from_name(ty.as_str()), Some(ty));
        }
        assert_eq!(FieldType::from_name("integer"), None);
        assert_eq!(FieldType::from_name("Text"), None);
    }

    #[test]
    fn serde_uses_document_names() {
        let json = serde_json::to_string(&FieldType::Textarea).unwrap();
        assert_eq!(json, "\"textarea\"");
        let back: PageKind = serde_json::from_str("\"kanban\"").unwrap();
        assert_eq!(back, PageKind::Kanban);
    }

    #[test]
    fn required_pages_are_list_form_detail() {
        let names: Vec<&str> = PageKind::REQUIRED.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["list", "form", "detail"]);
    }
}
