//! Schema catalog: introspected once at startup, immutable afterwards.

mod introspect;
mod types;

pub use types::{Catalog, ColumnDescriptor, TableDescriptor};
