//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a table descriptor.
//!
//! Column and table identifiers come exclusively from the catalog (never from
//! client input); client-supplied values always travel as bind parameters.

use crate::catalog::TableDescriptor;
use crate::query::SortOrder;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only catalog-reported names).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: every catalog column, quoted, in ordinal order.
fn select_column_list(table: &TableDescriptor) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cast suffix for a declared type, so text-bound values coerce server-side
/// (e.g. "$1::integer", "$1::character varying"). Pseudo-types that are not
/// valid cast targets get no cast.
fn cast_for(data_type: &str) -> Option<String> {
    let lower = data_type.to_lowercase();
    if lower == "array" || lower == "user-defined" {
        return None;
    }
    if lower.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '_') {
        Some(format!("::{}", lower))
    } else {
        None
    }
}

/// Placeholder for a value bound against a known column, cast to its type.
fn placeholder(table: &TableDescriptor, column: &str, param_num: usize) -> String {
    let cast = table
        .columns
        .iter()
        .find(|c| c.name == column)
        .and_then(|c| cast_for(&c.data_type))
        .unwrap_or_default();
    format!("${}{}", param_num, cast)
}

/// Resolved, conjunctive clauses for a collection SELECT. Column names are
/// canonical (already resolved through the column map).
#[derive(Default)]
pub struct ListClauses {
    /// (id column, bound) for `id >= bound`.
    pub offset: Option<(String, i64)>,
    /// (column, literal) for `column LIKE '%literal%'`.
    pub search: Option<(String, String)>,
    /// (column, direction) for ORDER BY.
    pub order: Option<(String, SortOrder)>,
    pub limit: Option<i64>,
}

/// SELECT with optional offset/search filters, ordering, and row cap.
pub fn select_list(schema: &str, table: &TableDescriptor, clauses: &ListClauses) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();

    if let Some((id_col, bound)) = &clauses.offset {
        let n = q.push_param(Value::Number((*bound).into()));
        where_parts.push(format!("{} >= {}", quoted(id_col), placeholder(table, id_col, n)));
    }
    if let Some((col, literal)) = &clauses.search {
        let n = q.push_param(Value::String(format!("%{}%", literal)));
        // LIKE has no implicit cast in PostgreSQL; compare textually
        where_parts.push(format!("{}::text LIKE ${}", quoted(col), n));
    }

    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = clauses
        .order
        .as_ref()
        .map(|(col, dir)| format!(" ORDER BY {} {}", quoted(col), dir.as_sql()))
        .unwrap_or_default();
    let limit_clause = clauses
        .limit
        .map(|n| format!(" LIMIT {}", n))
        .unwrap_or_default();

    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        select_column_list(table),
        qualified_table(schema, &table.name),
        where_clause,
        order_clause,
        limit_clause
    );
    q
}

/// SELECT by the id column. The identifier arrives as a path string and is
/// cast server-side to the column's declared type.
pub fn select_by_id(schema: &str, table: &TableDescriptor, id_col: &str, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(table),
        qualified_table(schema, &table.name),
        quoted(id_col),
        placeholder(table, id_col, n)
    );
    q
}

/// INSERT the given canonical (column, value) entries, returning the full
/// persisted record so database-assigned defaults come back to the client.
pub fn insert(schema: &str, table: &TableDescriptor, entries: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let target = qualified_table(schema, &table.name);
    let returning = select_column_list(table);
    if entries.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", target, returning);
        return q;
    }
    let mut cols = Vec::with_capacity(entries.len());
    let mut placeholders = Vec::with_capacity(entries.len());
    for (col, val) in entries {
        let n = q.push_param(val.clone());
        cols.push(quoted(col));
        placeholders.push(placeholder(table, col, n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        target,
        cols.join(", "),
        placeholders.join(", "),
        returning
    );
    q
}

/// UPDATE by id, setting each canonical (column, value) entry; returns the
/// updated record. An entry-less update degrades to the plain SELECT so the
/// caller still answers with the current row.
pub fn update(
    schema: &str,
    table: &TableDescriptor,
    id_col: &str,
    id: &str,
    entries: &[(String, Value)],
) -> QueryBuf {
    if entries.is_empty() {
        return select_by_id(schema, table, id_col, id);
    }
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(entries.len());
    for (col, val) in entries {
        let n = q.push_param(val.clone());
        sets.push(format!("{} = {}", quoted(col), placeholder(table, col, n)));
    }
    let id_param = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified_table(schema, &table.name),
        sets.join(", "),
        quoted(id_col),
        placeholder(table, id_col, id_param),
        select_column_list(table)
    );
    q
}

/// DELETE by id, returning the stored identifier of the removed row.
pub fn delete(schema: &str, table: &TableDescriptor, id_col: &str, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        qualified_table(schema, &table.name),
        quoted(id_col),
        placeholder(table, id_col, n),
        quoted(id_col)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnDescriptor;
    use serde_json::json;

    fn items() -> TableDescriptor {
        let cols = vec![
            ColumnDescriptor {
                name: "id".into(),
                data_type: "integer".into(),
                max_length: None,
                position: 1,
            },
            ColumnDescriptor {
                name: "name".into(),
                data_type: "character varying".into(),
                max_length: Some(64),
                position: 2,
            },
            ColumnDescriptor {
                name: "qty".into(),
                data_type: "integer".into(),
                max_length: None,
                position: 3,
            },
        ];
        TableDescriptor::new("items".into(), cols, &["id".into()])
    }

    #[test]
    fn select_list_without_clauses_is_bare() {
        let q = select_list("public", &items(), &ListClauses::default());
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"qty\" FROM \"public\".\"items\""
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_list_composes_all_clauses_conjunctively() {
        let clauses = ListClauses {
            offset: Some(("id".into(), 5)),
            search: Some(("name".into(), "bolt".into())),
            order: Some(("qty".into(), SortOrder::Desc)),
            limit: Some(10),
        };
        let q = select_list("public", &items(), &clauses);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"qty\" FROM \"public\".\"items\" \
             WHERE \"id\" >= $1::integer AND \"name\"::text LIKE $2 \
             ORDER BY \"qty\" DESC LIMIT 10"
        );
        assert_eq!(q.params, vec![json!(5), json!("%bolt%")]);
    }

    #[test]
    fn select_by_id_casts_to_the_id_column_type() {
        let q = select_by_id("public", &items(), "id", "7");
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"qty\" FROM \"public\".\"items\" WHERE \"id\" = $1::integer"
        );
        assert_eq!(q.params, vec![json!("7")]);
    }

    #[test]
    fn insert_returns_all_columns() {
        let entries = vec![
            ("name".to_string(), json!("bolt")),
            ("qty".to_string(), json!(10)),
        ];
        let q = insert("public", &items(), &entries);
        assert_eq!(
            q.sql,
            "INSERT INTO \"public\".\"items\" (\"name\", \"qty\") \
             VALUES ($1::character varying, $2::integer) \
             RETURNING \"id\", \"name\", \"qty\""
        );
        assert_eq!(q.params, vec![json!("bolt"), json!(10)]);
    }

    #[test]
    fn empty_insert_uses_default_values() {
        let q = insert("public", &items(), &[]);
        assert_eq!(
            q.sql,
            "INSERT INTO \"public\".\"items\" DEFAULT VALUES RETURNING \"id\", \"name\", \"qty\""
        );
    }

    #[test]
    fn update_sets_entries_and_returns_row() {
        let entries = vec![("qty".to_string(), json!(3))];
        let q = update("public", &items(), "id", "1", &entries);
        assert_eq!(
            q.sql,
            "UPDATE \"public\".\"items\" SET \"qty\" = $1::integer \
             WHERE \"id\" = $2::integer RETURNING \"id\", \"name\", \"qty\""
        );
        assert_eq!(q.params, vec![json!(3), json!("1")]);
    }

    #[test]
    fn empty_update_falls_back_to_select() {
        let q = update("public", &items(), "id", "1", &[]);
        assert!(q.sql.starts_with("SELECT"));
        assert_eq!(q.params, vec![json!("1")]);
    }

    #[test]
    fn delete_returns_only_the_identifier() {
        let q = delete("public", &items(), "id", "1");
        assert_eq!(
            q.sql,
            "DELETE FROM \"public\".\"items\" WHERE \"id\" = $1::integer RETURNING \"id\""
        );
    }

    #[test]
    fn pseudo_types_get_no_cast() {
        assert_eq!(cast_for("ARRAY"), None);
        assert_eq!(cast_for("USER-DEFINED"), None);
        assert_eq!(cast_for("timestamp without time zone").as_deref(), Some("::timestamp without time zone"));
    }
}
