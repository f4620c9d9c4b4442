//! Generic CRUD execution and the cached catalog projections.

mod crud;
mod projection;
pub use crud::{row_to_json, CrudExecutor, CrudPlan};
pub use projection::{metadata_projection, permissions_projection};
