//! # pgstmt
//!
//! A typed PostgreSQL statement builder.
//!
//! ## Features
//!
//! - **One statement, one argument list**: every chain compiles to a single SQL
//!   string with `$1..$N` placeholders and the values for them, in order
//! - **Arbitrary predicates**: AND/OR trees of any depth, numbered correctly
//! - **Legal chains only**: which clause may follow which is checked by the
//!   compiler (no JOIN after DELETE, no second WHERE)
//! - **Pagination in one round trip**: a page of rows plus the total count
//! - **Transaction-friendly**: run compiled statements on anything implementing
//!   `GenericClient`, including a serializable `Transaction`
//!
//! ## Example
//!
//! ```ignore
//! use pgstmt::prelude::*;
//!
//! // SELECT
//! let rules = select("command_rules")
//!     .columns(["rule_id", "command"])
//!     .filter()
//!     .field("server_id", Comparison::EQUAL, server_id)
//!     .compile()?
//!     .fetch(&client)
//!     .await?;
//!
//! // INSERT ... ON CONFLICT
//! insert("pairings")
//!     .set("user_id", user_id)
//!     .set("partner_id", partner_id)
//!     .on_conflict(["user_id"])
//!     .do_update()
//!     .set_excluded("partner_id")
//!     .compile()?
//!     .execute(&client)
//!     .await?;
//!
//! // Pagination
//! let page = select("reminders")
//!     .column("*")
//!     .filter()
//!     .field("user_id", Comparison::EQUAL, user_id)
//!     .paginate(page_index, 10, ["remind_at"])
//!     .compile()?
//!     .fetch_or_first_page(&client)
//!     .await?;
//! ```

/// DEBUG event on the `pgstmt.sql` target when the `tracing` feature is on.
macro_rules! sql_debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(target: "pgstmt.sql", $($arg)+);
        }
    };
}

/// WARN event on the `pgstmt.sql` target when the `tracing` feature is on.
macro_rules! sql_warn {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(target: "pgstmt.sql", $($arg)+);
        }
    };
}

pub(crate) use sql_debug;
pub(crate) use sql_warn;

pub mod builder;
pub mod client;
pub mod compiled;
pub mod constraint;
pub mod error;
pub mod paginate;
pub mod prelude;
pub mod retry;
pub mod row;
pub mod value;

pub use builder::{
    Compile, Delete, Exists, FieldValue, Filterable, FunctionCall, Insert, Join, JoinKind,
    Joinable, Limit, Limitable, OnConflict, OnConflictDoNothing, OnConflictUpdate, OrderBy,
    Orderable, QueryPart, Returnable, Returning, Select, SelectStage, Update, Where, Wrappable,
    delete, insert, select, select_count, update,
};
pub use client::GenericClient;
pub use compiled::CompiledQuery;
pub use constraint::{
    ColumnConstraint, Comparison, Connector, Constraint, LogicalConstraint, Operand,
    and_expression, or_expression,
};
pub use error::{SERIALIZATION_FAILURE, StmtError, StmtResult};
pub use paginate::{
    COUNT_CTE, CompiledPaginationQuery, DATA_CTE, Paginate, Paginated, PaginationResult,
    TOTAL_ROWS_COLUMN,
};
pub use retry::{RetryPolicy, retry_on_serialization_failure};
pub use row::{FromRow, RowExt};
pub use value::Value;

// Re-export tokio_postgres for convenience
pub use tokio_postgres;
