//! The native boundary of the mutation adapter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tetra_core::{Context, Status};
use tetra_model::Record;

use crate::{Key, KeySet, Mutation, SpannerConfig};

/// A strongly consistent database that takes mutations.
pub trait Database: Send + Sync {
    /// Applies all mutations atomically; returns the commit timestamp.
    fn apply(&self, cx: &Context, mutations: Vec<Mutation>) -> Result<DateTime<Utc>, Status>;

    /// Reads one row. A missing row is a `NotFound` status.
    fn read_row(
        &self,
        cx: &Context,
        table: &str,
        key: &Key,
        columns: &[String],
    ) -> Result<Record, Status>;

    /// Reads the rows of `keys` that exist, in primary key order. A key
    /// listed twice yields its row once.
    fn read(
        &self,
        cx: &Context,
        table: &str,
        keys: &KeySet,
        columns: &[String],
    ) -> Result<Vec<Record>, Status>;

    /// The primary key columns of `table`, in key order.
    fn key_columns(&self, cx: &Context, table: &str) -> Result<Vec<String>, Status>;

    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Opens a database from connection settings.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &SpannerConfig) -> Result<Arc<dyn Database>, Status>;
}
