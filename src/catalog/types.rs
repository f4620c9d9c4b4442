//! Table and column descriptors plus the process-wide catalog.
//!
//! Lookups from client-supplied names are always lower-cased against maps
//! built once at introspection time; the database is never re-queried for
//! metadata during a request. A schema change therefore requires a restart.

use crate::error::ApiError;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// One column as reported by the database.
#[derive(Clone, Debug)]
pub struct ColumnDescriptor {
    /// Canonical (database-reported) column name.
    pub name: String,
    /// Declared type name, e.g. "integer", "character varying".
    pub data_type: String,
    /// Declared length for character types, when applicable.
    pub max_length: Option<i32>,
    /// 1-based ordinal position.
    pub position: i32,
}

/// One table: canonical name, ordered columns, and the two case-insensitive
/// lookup maps (lowercase -> canonical).
#[derive(Clone, Debug)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub column_map: BTreeMap<String, String>,
    pub primary_key_map: BTreeMap<String, String>,
}

impl TableDescriptor {
    pub fn new(name: String, columns: Vec<ColumnDescriptor>, primary_keys: &[String]) -> Self {
        let column_map = columns
            .iter()
            .map(|c| (c.name.to_lowercase(), c.name.clone()))
            .collect();
        let primary_key_map = primary_keys
            .iter()
            .map(|k| (k.to_lowercase(), k.clone()))
            .collect();
        TableDescriptor {
            name,
            columns,
            column_map,
            primary_key_map,
        }
    }

    /// Resolve a client-supplied column name to its canonical spelling.
    pub fn resolve_column(&self, key: &str) -> Result<&str, ApiError> {
        self.column_map
            .get(&key.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| {
                ApiError::unknown_column(&self.name, key, self.column_map.values().cloned())
            })
    }

    /// Canonical name of the `id` primary key column, when the table has one.
    /// Identifier-addressed operations and the offset filter require it.
    pub fn id_column(&self) -> Option<&str> {
        self.primary_key_map.get("id").map(String::as_str)
    }
}

/// All tables of the configured schema, keyed by lower-cased table name.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub schema: String,
    tables: HashMap<String, TableDescriptor>,
}

impl Catalog {
    pub fn new(schema: String, tables: Vec<TableDescriptor>) -> Self {
        let tables = tables
            .into_iter()
            .map(|t| (t.name.to_lowercase(), t))
            .collect();
        Catalog { schema, tables }
    }

    /// Case-insensitive resource lookup.
    pub fn describe(&self, resource: &str) -> Result<&TableDescriptor, ApiError> {
        self.tables
            .get(&resource.to_lowercase())
            .ok_or_else(|| ApiError::UnknownResource(resource.to_string()))
    }

    /// Tables in canonical-name order (stable metadata output).
    pub fn tables(&self) -> Vec<&TableDescriptor> {
        let mut all: Vec<&TableDescriptor> = self.tables.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
