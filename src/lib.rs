//! sqlgate: a schema-introspecting generic CRUD API for PostgreSQL.
//!
//! The database's tables and columns are introspected once at startup into
//! an immutable [`catalog::Catalog`]; requests against any table are then
//! validated against that catalog and translated into parameterized SQL.
//! No per-table code anywhere.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use catalog::{Catalog, ColumnDescriptor, TableDescriptor};
pub use config::Settings;
pub use error::{ApiError, ConfigError};
pub use query::{parse_query_params, QueryRequest, SortOrder};
pub use routes::{api_routes, common_routes};
pub use service::CrudExecutor;
pub use state::AppState;
