//! Row mapping traits

use crate::error::{StmtError, StmtResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for types that can be built from a database row.
///
/// Repositories implement this for their models; compiled queries use it in
/// the `*_as` fetch variants.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> StmtResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning StmtError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> StmtResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Try to get a column value by position, returning StmtError::Decode on failure
    fn try_get_index<T>(&self, index: usize) -> StmtResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> StmtResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| StmtError::decode(column, e.to_string()))
    }

    fn try_get_index<T>(&self, index: usize) -> StmtResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(index)
            .map_err(|e| StmtError::decode(index.to_string(), e.to_string()))
    }
}
