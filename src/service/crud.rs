//! Generic CRUD execution against PostgreSQL.
//!
//! `plan` is the pure half: it validates the request against the catalog and
//! builds the statement, so every taxonomy error surfaces before any SQL is
//! sent and a body with one bad key mutates nothing. `execute` runs the plan
//! and shapes the rows. `handle` composes the two and is the single
//! operation the HTTP layer consumes.

use crate::catalog::{Catalog, TableDescriptor};
use crate::error::ApiError;
use crate::query::parse_query_params;
use crate::sql::{delete, insert, select_by_id, select_list, update, ListClauses, PgBindValue, QueryBuf};
use axum::http::Method;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

/// A validated request, translated to one statement plus its result shape.
#[derive(Debug)]
pub enum CrudPlan {
    /// All returned rows (collection GET, single-record GET, entry-less PUT).
    Select(QueryBuf),
    /// Exactly one created row.
    Insert(QueryBuf),
    /// Zero or one updated rows; absence is a silent no-op.
    Update(QueryBuf),
    /// Zero or one deleted rows; the row carries only the identifier.
    Delete(QueryBuf),
}

pub struct CrudExecutor;

impl CrudExecutor {
    /// Translate method x id-presence x parameters/body into a plan.
    pub fn plan(
        catalog: &Catalog,
        method: &Method,
        resource: &str,
        id: Option<&str>,
        params: &HashMap<String, String>,
        body: Option<&Value>,
    ) -> Result<CrudPlan, ApiError> {
        let table = catalog.describe(resource)?;
        let schema = catalog.schema.as_str();

        match (method.as_str(), id) {
            ("GET", None) => {
                let q = parse_query_params(params)?;
                let mut clauses = ListClauses::default();
                if let Some(offset) = q.offset {
                    let id_col = Self::id_column(table)?;
                    clauses.offset = Some((id_col.to_string(), offset));
                }
                if let (Some(search), Some(key)) = (&q.search, &q.search_key) {
                    clauses.search = Some((table.resolve_column(key)?.to_string(), search.clone()));
                }
                if let (Some(order), Some(key)) = (q.order, &q.order_key) {
                    clauses.order = Some((table.resolve_column(key)?.to_string(), order));
                }
                clauses.limit = q.limit;
                Ok(CrudPlan::Select(select_list(schema, table, &clauses)))
            }
            // single-record GET ignores filter/sort/paginate parameters
            ("GET", Some(id)) => {
                let id_col = Self::id_column(table)?;
                Ok(CrudPlan::Select(select_by_id(schema, table, id_col, id)))
            }
            ("POST", None) => {
                let entries = Self::canonical_entries(table, Self::required_body(method, body)?)?;
                Ok(CrudPlan::Insert(insert(schema, table, &entries)))
            }
            ("PUT", Some(id)) => {
                let entries = Self::canonical_entries(table, Self::required_body(method, body)?)?;
                let id_col = Self::id_column(table)?;
                Ok(CrudPlan::Update(update(schema, table, id_col, id, &entries)))
            }
            ("DELETE", Some(id)) => {
                let id_col = Self::id_column(table)?;
                Ok(CrudPlan::Delete(delete(schema, table, id_col, id)))
            }
            _ => Err(ApiError::InvalidMethodForPath {
                method: method.to_string(),
                path: match id {
                    Some(id) => format!("/api/v1/{}/{}", resource, id),
                    None => format!("/api/v1/{}", resource),
                },
            }),
        }
    }

    /// Run a plan and shape the outcome as the response row list.
    pub async fn execute(pool: &PgPool, plan: CrudPlan) -> Result<Vec<Value>, ApiError> {
        match plan {
            CrudPlan::Select(q) => Self::query_many(pool, &q).await,
            CrudPlan::Insert(q) => {
                let row = Self::query_optional(pool, &q)
                    .await?
                    .ok_or_else(|| ApiError::Storage(sqlx::Error::RowNotFound))?;
                Ok(vec![row])
            }
            CrudPlan::Update(q) => Ok(Self::query_optional(pool, &q).await?.into_iter().collect()),
            CrudPlan::Delete(q) => {
                let deleted = Self::query_optional(pool, &q).await?;
                Ok(deleted
                    .and_then(|row| row.as_object().and_then(|m| m.values().next().cloned()))
                    .into_iter()
                    .collect())
            }
        }
    }

    /// The single operation exposed to the HTTP layer:
    /// handle(resource, id, params, body) -> rows or a taxonomy error.
    pub async fn handle(
        pool: &PgPool,
        catalog: &Catalog,
        method: &Method,
        resource: &str,
        id: Option<&str>,
        params: &HashMap<String, String>,
        body: Option<&Value>,
    ) -> Result<Vec<Value>, ApiError> {
        let plan = Self::plan(catalog, method, resource, id, params, body)?;
        Self::execute(pool, plan).await
    }

    fn id_column(table: &TableDescriptor) -> Result<&str, ApiError> {
        table
            .id_column()
            .ok_or_else(|| ApiError::UnsupportedOperation(table.name.clone()))
    }

    fn required_body<'a>(method: &Method, body: Option<&'a Value>) -> Result<&'a Value, ApiError> {
        body.ok_or_else(|| ApiError::MalformedQuery(format!("{} expects a JSON body", method)))
    }

    /// Validate every body key through the column map before anything runs;
    /// one unrecognized key fails the whole operation.
    fn canonical_entries(
        table: &TableDescriptor,
        body: &Value,
    ) -> Result<Vec<(String, Value)>, ApiError> {
        let map = body
            .as_object()
            .ok_or_else(|| ApiError::MalformedQuery("body must be a JSON object".to_string()))?;
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let canonical = table.resolve_column(key)?;
            entries.push((canonical.to_string(), value.clone()));
        }
        Ok(entries)
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, ApiError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, ApiError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

pub fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        let v = cell_to_value(row, name);
        map.insert(name.to_string(), v);
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
        if let Some(n) = v {
            return Value::Number(n.into());
        }
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        if let Some(n) = v {
            return Value::Number(n.into());
        }
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        if let Some(n) = v {
            return Value::Number(n.into());
        }
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = v {
            if let Some(n) = serde_json::Number::from_f64(n as f64) {
                return Value::Number(n);
            }
        }
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = v {
            if let Some(n) = serde_json::Number::from_f64(n) {
                return Value::Number(n);
            }
        }
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        if let Some(b) = v {
            return Value::Bool(b);
        }
    }
    if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        if let Some(u) = v {
            return Value::String(u.to_string());
        }
    }
    // datetimes serialize human-readable, microsecond precision
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        if let Some(d) = v {
            return Value::String(d.format("%Y-%m-%d %H:%M:%S%.6f").to_string());
        }
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        if let Some(d) = v {
            return Value::String(d.format("%Y-%m-%d %H:%M:%S%.6f").to_string());
        }
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        if let Some(d) = v {
            return Value::String(d.format("%Y-%m-%d").to_string());
        }
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        if let Some(s) = v {
            return Value::String(s);
        }
    }
    if let Ok(v) = row.try_get::<Option<serde_json::Value>, _>(name) {
        if let Some(j) = v {
            return j;
        }
    }
    Value::Null
}
