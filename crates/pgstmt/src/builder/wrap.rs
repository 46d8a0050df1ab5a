//! Wrappers that turn a whole statement into the operand of an outer SELECT.
//!
//! Unlike the other modifiers these do not append a clause: the parent's SQL
//! ends up inside parentheses and its arguments pass through unchanged.

use super::QueryPart;
use crate::error::{StmtError, StmtResult};
use crate::value::Value;

/// `SELECT EXISTS (<statement>)`
#[derive(Clone, Debug)]
pub struct Exists<P> {
    parent: P,
}

impl<P: QueryPart> Exists<P> {
    pub(crate) fn new(parent: P) -> Self {
        Self { parent }
    }
}

impl<P: QueryPart> QueryPart for Exists<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        let (sql, args) = self.parent.build()?;
        Ok((format!("SELECT EXISTS ({sql})"), args))
    }
}

/// `SELECT <function>((<statement>)[, <arg>...])`
///
/// Extra arguments are raw SQL and consume no placeholder:
///
/// ```ignore
/// // SELECT COALESCE((SELECT balance FROM wallets WHERE user_id = $1), 0)
/// select("wallets")
///     .column("balance")
///     .filter()
///     .field("user_id", Comparison::EQUAL, user_id)
///     .call("COALESCE")
///     .arg("0")
/// ```
#[derive(Clone, Debug)]
pub struct FunctionCall<P> {
    parent: P,
    function: String,
    extra_args: Vec<String>,
}

impl<P: QueryPart> FunctionCall<P> {
    pub(crate) fn new(parent: P, function: &str) -> Self {
        Self {
            parent,
            function: function.to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Append a raw SQL argument after the statement.
    pub fn arg(mut self, sql: &str) -> Self {
        self.extra_args.push(sql.to_string());
        self
    }
}

impl<P: QueryPart> QueryPart for FunctionCall<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.function.trim().is_empty() {
            return Err(StmtError::validation("function call requires a function name"));
        }
        let (sql, args) = self.parent.build()?;
        let mut call = format!("SELECT {}(({sql})", self.function);
        for extra in &self.extra_args {
            call.push_str(", ");
            call.push_str(extra);
        }
        call.push(')');
        Ok((call, args))
    }
}
