//! Cacheable projections of the catalog and of database-reported privileges.

use crate::catalog::Catalog;
use crate::error::ApiError;
use crate::service::row_to_json;
use serde_json::{json, Map, Value};
use sqlx::PgPool;

/// Per-table privilege introspection, the PostgreSQL counterpart of
/// `sp_table_privileges`. Rows are cached verbatim by the caller.
const PERMISSIONS_SQL: &str = "\
SELECT grantee::text, table_catalog::text, table_schema::text, table_name::text, \
       privilege_type::text, is_grantable::text \
FROM information_schema.role_table_grants \
WHERE table_schema = $1 \
ORDER BY table_name, grantee, privilege_type";

/// Serialize the catalog: for each table its ordered columns (position,
/// type, declared length) and both lookup maps. Pure over the catalog, so
/// the caller caches it for the process lifetime.
pub fn metadata_projection(catalog: &Catalog) -> Value {
    let mut tables = Map::new();
    for table in catalog.tables() {
        let mut columns = Map::new();
        for c in &table.columns {
            columns.insert(
                c.name.clone(),
                json!({
                    "position": c.position,
                    "type": c.data_type,
                    "name": c.name,
                    "length": c.max_length,
                }),
            );
        }
        tables.insert(
            table.name.clone(),
            json!({
                "columns": columns,
                "primary_key_map": table.primary_key_map,
                "column_map": table.column_map,
            }),
        );
    }
    Value::Object(tables)
}

/// Run the privilege query once; rows pass through as mappings with no
/// reshaping.
pub async fn permissions_projection(pool: &PgPool, schema: &str) -> Result<Vec<Value>, ApiError> {
    tracing::debug!(sql = PERMISSIONS_SQL, schema = %schema, "query");
    let rows = sqlx::query(PERMISSIONS_SQL)
        .bind(schema)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDescriptor, TableDescriptor};

    #[test]
    fn metadata_lists_columns_with_position_type_and_length() {
        let table = TableDescriptor::new(
            "Items".into(),
            vec![
                ColumnDescriptor {
                    name: "Id".into(),
                    data_type: "integer".into(),
                    max_length: None,
                    position: 1,
                },
                ColumnDescriptor {
                    name: "Name".into(),
                    data_type: "character varying".into(),
                    max_length: Some(64),
                    position: 2,
                },
            ],
            &["Id".into()],
        );
        let catalog = Catalog::new("public".into(), vec![table]);
        let v = metadata_projection(&catalog);

        let items = &v["Items"];
        assert_eq!(items["columns"]["Name"]["position"], 2);
        assert_eq!(items["columns"]["Name"]["type"], "character varying");
        assert_eq!(items["columns"]["Name"]["length"], 64);
        assert_eq!(items["columns"]["Id"]["length"], Value::Null);
        // maps key lowercase, value canonical
        assert_eq!(items["column_map"]["name"], "Name");
        assert_eq!(items["primary_key_map"]["id"], "Id");
    }
}
