//! Convenient imports for typical `pgstmt` usage.
//!
//! Brings the root constructors and every stage trait into scope, which the
//! chain methods need:
//!
//! ```ignore
//! use pgstmt::prelude::*;
//! ```

pub use crate::{
    Compile, Comparison, CompiledPaginationQuery, CompiledQuery, Connector, Constraint,
    Filterable, FromRow, GenericClient, Joinable, Limitable, Orderable, Paginate,
    PaginationResult, Returnable, RowExt, StmtError, StmtResult, Value, Wrappable,
    and_expression, delete, insert, or_expression, select, select_count, update,
};
