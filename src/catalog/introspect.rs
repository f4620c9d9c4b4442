//! One-time schema introspection against `information_schema`.

use crate::catalog::{Catalog, ColumnDescriptor, TableDescriptor};
use crate::error::ApiError;
use sqlx::PgPool;
use std::collections::HashMap;

// information_schema columns are typed with domains (sql_identifier,
// cardinal_number); cast to plain text/int4 for decoding.
const TABLES_SQL: &str = "\
SELECT table_name::text FROM information_schema.tables \
WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
ORDER BY table_name";

const COLUMNS_SQL: &str = "\
SELECT table_name::text, column_name::text, data_type::text, \
       character_maximum_length::int4, ordinal_position::int4 \
FROM information_schema.columns \
WHERE table_schema = $1 \
ORDER BY table_name, ordinal_position";

const PRIMARY_KEYS_SQL: &str = "\
SELECT tc.table_name::text, kcu.column_name::text \
FROM information_schema.table_constraints tc \
JOIN information_schema.key_column_usage kcu \
  ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
WHERE tc.table_schema = $1 AND tc.constraint_type = 'PRIMARY KEY' \
ORDER BY kcu.ordinal_position";

impl Catalog {
    /// Enumerate every base table in `schema`, its columns in ordinal order,
    /// and its primary-key columns. Amortizes introspection over the process
    /// lifetime; call once at startup.
    pub async fn introspect(pool: &PgPool, schema: &str) -> Result<Catalog, ApiError> {
        let table_names: Vec<(String,)> = sqlx::query_as(TABLES_SQL)
            .bind(schema)
            .fetch_all(pool)
            .await?;

        let columns: Vec<(String, String, String, Option<i32>, i32)> = sqlx::query_as(COLUMNS_SQL)
            .bind(schema)
            .fetch_all(pool)
            .await?;
        let mut columns_by_table: HashMap<String, Vec<ColumnDescriptor>> = HashMap::new();
        for (table, name, data_type, max_length, position) in columns {
            columns_by_table.entry(table).or_default().push(ColumnDescriptor {
                name,
                data_type,
                max_length,
                position,
            });
        }

        let pks: Vec<(String, String)> = sqlx::query_as(PRIMARY_KEYS_SQL)
            .bind(schema)
            .fetch_all(pool)
            .await?;
        let mut pks_by_table: HashMap<String, Vec<String>> = HashMap::new();
        for (table, column) in pks {
            pks_by_table.entry(table).or_default().push(column);
        }

        let mut tables = Vec::with_capacity(table_names.len());
        for (name,) in table_names {
            let columns = columns_by_table.remove(&name).unwrap_or_default();
            let pk = pks_by_table.remove(&name).unwrap_or_default();
            tables.push(TableDescriptor::new(name, columns, &pk));
        }

        let catalog = Catalog::new(schema.to_string(), tables);
        tracing::info!(schema = %schema, tables = catalog.len(), "catalog built");
        Ok(catalog)
    }
}
