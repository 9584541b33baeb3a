//! Per-target type tables.
//!
//! Each [`TypeTable`] maps every [`FieldType`] to the type spelled in one
//! target language. Emitters look types up here instead of matching on
//! the enum themselves so the three targets cannot drift apart.

use crate::types::FieldType;

/// A field type with no row in a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field type '{ty}' has no mapping in the {table} type table")]
pub struct UnmappedType {
    pub table: &'static str,
    pub ty: FieldType,
}

/// Static mapping from field type to target type name.
#[derive(Debug)]
pub struct TypeTable {
    pub name: &'static str,
    pub rows: &'static [(FieldType, &'static str)],
}

impl TypeTable {
    /// Look up the target type. Misses are errors, never a default.
    pub fn lookup(&self, ty: FieldType) -> Result<&'static str, UnmappedType> {
        self.rows
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, target)| *target)
            .ok_or(UnmappedType {
                table: self.name,
                ty,
            })
    }
}

/// PostgreSQL column types.
pub static SQL_TYPES: TypeTable = TypeTable {
    name: "sql",
    rows: &[
        (FieldType::Text, "VARCHAR(255)"),
        (FieldType::Number, "NUMERIC(10,2)"),
        (FieldType::Date, "TIMESTAMPTZ"),
        (FieldType::Boolean, "BOOLEAN"),
        (FieldType::Email, "VARCHAR(255)"),
        (FieldType::Url, "VARCHAR(500)"),
        (FieldType::Textarea, "TEXT"),
    ],
};

/// Rust types used by the generated backend models.
pub static SERVICE_TYPES: TypeTable = TypeTable {
    name: "service",
    rows: &[
        (FieldType::Text, "String"),
        (FieldType::Number, "f64"),
        (FieldType::Date, "DateTime<Utc>"),
        (FieldType::Boolean, "bool"),
        (FieldType::Email, "String"),
        (FieldType::Url, "String"),
        (FieldType::Textarea, "String"),
    ],
};

/// TypeScript types used by the generated frontend clients.
pub static CLIENT_TYPES: TypeTable = TypeTable {
    name: "client",
    rows: &[
        (FieldType::Text, "string"),
        (FieldType::Number, "number"),
        (FieldType::Date, "string"),
        (FieldType::Boolean, "boolean"),
        (FieldType::Email, "string"),
        (FieldType::Url, "string"),
        (FieldType::Textarea, "string"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_is_total() {
        for table in [&SQL_TYPES, &SERVICE_TYPES, &CLIENT_TYPES] {
            for ty in FieldType::ALL {
                let mapped = table.lookup(ty).unwrap();
                assert!(!mapped.is_empty(), "{} maps {ty} to empty", table.name);
            }
            assert_eq!(table.rows.len(), FieldType::ALL.len());
        }
    }

    #[test]
    fn known_mappings() {
        assert_eq!(SQL_TYPES.lookup(FieldType::Url).unwrap(), "VARCHAR(500)");
        assert_eq!(SQL_TYPES.lookup(FieldType::Number).unwrap(), "NUMERIC(10,2)");
        assert_eq!(SERVICE_TYPES.lookup(FieldType::Date).unwrap(), "DateTime<Utc>");
        assert_eq!(CLIENT_TYPES.lookup(FieldType::Boolean).unwrap(), "boolean");
    }

    #[test]
    fn missing_row_is_an_error() {
        static PARTIAL: TypeTable = TypeTable {
            name: "partial",
            rows: &[(FieldType::Text, "text")],
        };
        let err = PARTIAL.lookup(FieldType::Email).unwrap_err();
        assert_eq!(err.table, "partial");
        assert_eq!(err.ty, FieldType::Email);
        assert_eq!(
            err.to_string(),
            "field type 'email' has no mapping in the partial type table"
        );
    }
}
