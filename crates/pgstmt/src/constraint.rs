//! Boolean expression trees for WHERE clauses.
//!
//! A [`Constraint`] is either a single column comparison, a parenthesized
//! AND/OR group of at least two constraints, or the [`Constraint::Empty`]
//! sentinel a fresh WHERE clause starts from.
//!
//! Placeholders are numbered while building: `build(base_index)` renders the
//! first bound value as `$<base_index + 1>` and every group threads the running
//! index through its children left to right, so nesting depth never disturbs
//! the numbering.
//!
//! ```ignore
//! use pgstmt::{and_expression, or_expression, Comparison, Constraint};
//!
//! let c = and_expression([
//!     Constraint::field("server_id", Comparison::EQUAL, "1234"),
//!     or_expression([
//!         Constraint::field("channel_id", Comparison::EQUAL, None::<&str>),
//!         Constraint::field("channel_id", Comparison::EQUAL, "5678"),
//!     ]),
//! ]);
//! // (server_id = $1 AND (channel_id IS NULL OR channel_id = $2))
//! ```

use crate::error::{StmtError, StmtResult};
use crate::value::Value;
use std::fmt;
use std::ops::BitOr;

/// A comparison operator assembled from flag primitives.
///
/// Combine primitives with `|`, e.g. `Comparison::GREATER | Comparison::EQUAL`
/// for `>=`. Only the combinations listed in [`Comparison::token`] render;
/// anything else is rejected when the constraint is built.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Comparison(u8);

impl Comparison {
    pub const EQUAL: Self = Self(1);
    pub const GREATER: Self = Self(1 << 1);
    pub const LESS: Self = Self(1 << 2);
    pub const NOT: Self = Self(1 << 3);
    pub const LIKE: Self = Self(1 << 4);
    pub const INSENSITIVE: Self = Self(1 << 5);
    pub const IN: Self = Self(1 << 6);

    pub const NOT_EQUAL: Self = Self::NOT.union(Self::EQUAL);
    pub const GREATER_OR_EQUAL: Self = Self::GREATER.union(Self::EQUAL);
    pub const LESS_OR_EQUAL: Self = Self::LESS.union(Self::EQUAL);
    pub const ILIKE: Self = Self::LIKE.union(Self::INSENSITIVE);
    pub const NOT_IN: Self = Self::NOT.union(Self::IN);

    /// Combine two flag sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every flag of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// SQL token for this combination, `None` if it is not a supported operator.
    ///
    /// | flags                         | token       |
    /// |-------------------------------|-------------|
    /// | `EQUAL`                       | `=`         |
    /// | `NOT \| EQUAL`                | `!=`        |
    /// | `GREATER`                     | `>`         |
    /// | `GREATER \| EQUAL`            | `>=`        |
    /// | `LESS`                        | `<`         |
    /// | `LESS \| EQUAL`               | `<=`        |
    /// | `LIKE`                        | `LIKE`      |
    /// | `NOT \| LIKE`                 | `NOT LIKE`  |
    /// | `LIKE \| INSENSITIVE`         | `ILIKE`     |
    /// | `NOT \| LIKE \| INSENSITIVE`  | `NOT ILIKE` |
    /// | `IN`                          | `IN`        |
    /// | `NOT \| IN`                   | `NOT IN`    |
    pub const fn token(self) -> Option<&'static str> {
        const EQUAL: u8 = Comparison::EQUAL.0;
        const GREATER: u8 = Comparison::GREATER.0;
        const LESS: u8 = Comparison::LESS.0;
        const NOT: u8 = Comparison::NOT.0;
        const LIKE: u8 = Comparison::LIKE.0;
        const INSENSITIVE: u8 = Comparison::INSENSITIVE.0;
        const IN: u8 = Comparison::IN.0;

        let token = match self.0 {
            EQUAL => "=",
            x if x == NOT | EQUAL => "!=",
            GREATER => ">",
            x if x == GREATER | EQUAL => ">=",
            LESS => "<",
            x if x == LESS | EQUAL => "<=",
            LIKE => "LIKE",
            x if x == NOT | LIKE => "NOT LIKE",
            x if x == LIKE | INSENSITIVE => "ILIKE",
            x if x == NOT | LIKE | INSENSITIVE => "NOT ILIKE",
            IN => "IN",
            x if x == NOT | IN => "NOT IN",
            _ => return None,
        };
        Some(token)
    }

    /// Whether this is a membership test (`IN` / `NOT IN`).
    pub const fn is_membership(self) -> bool {
        self.contains(Self::IN)
    }

    fn require_token(self) -> StmtResult<&'static str> {
        self.token()
            .ok_or_else(|| StmtError::validation(format!("unsupported comparison {self:?}")))
    }
}

impl BitOr for Comparison {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Comparison, &str); 7] = [
            (Comparison::NOT, "NOT"),
            (Comparison::EQUAL, "EQUAL"),
            (Comparison::GREATER, "GREATER"),
            (Comparison::LESS, "LESS"),
            (Comparison::LIKE, "LIKE"),
            (Comparison::INSENSITIVE, "INSENSITIVE"),
            (Comparison::IN, "IN"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "Comparison(EMPTY)")
        } else {
            write!(f, "Comparison({})", names.join(" | "))
        }
    }
}

/// How the children of a logical group are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    fn separator(self) -> &'static str {
        match self {
            Connector::And => " AND ",
            Connector::Or => " OR ",
        }
    }
}

/// Right-hand side of a column comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Bound as a positional parameter.
    Bind(Value),
    /// Spliced into the SQL verbatim; consumes no placeholder.
    ///
    /// The text is not escaped or validated in any way, so it must never carry
    /// user input. Use it for SQL functions, casts and cross-column
    /// expressions such as `NOW() AT TIME ZONE 'utc'` or `balance + 10`.
    Raw(String),
}

/// A single `<column> <op> <operand>` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConstraint {
    pub column: String,
    pub comparison: Comparison,
    pub operand: Operand,
}

impl ColumnConstraint {
    /// Whether the operand is spliced as raw SQL text.
    pub fn is_raw(&self) -> bool {
        matches!(self.operand, Operand::Raw(_))
    }

    fn build(&self, base_index: usize) -> StmtResult<(String, Vec<Value>)> {
        let token = self.comparison.require_token()?;
        let column = &self.column;

        let value = match &self.operand {
            Operand::Raw(text) => return Ok((format!("{column} {token} {text}"), Vec::new())),
            Operand::Bind(value) => value,
        };

        if self.comparison.is_membership() {
            let values = match value {
                Value::List(values) => values.clone(),
                scalar => vec![scalar.clone()],
            };
            if values.is_empty() {
                let always = if self.comparison.contains(Comparison::NOT) {
                    "1=1"
                } else {
                    "1=0"
                };
                return Ok((always.to_string(), Vec::new()));
            }
            let placeholders: Vec<String> = (1..=values.len())
                .map(|i| format!("${}", base_index + i))
                .collect();
            return Ok((
                format!("{column} {token} ({})", placeholders.join(", ")),
                values,
            ));
        }

        match value {
            Value::Null if self.comparison == Comparison::EQUAL => {
                Ok((format!("{column} IS NULL"), Vec::new()))
            }
            Value::Null if self.comparison == Comparison::NOT_EQUAL => {
                Ok((format!("{column} IS NOT NULL"), Vec::new()))
            }
            Value::Null => Err(StmtError::validation(format!(
                "column '{column}': NULL can only be compared with EQUAL or NOT | EQUAL"
            ))),
            Value::List(_) => Err(StmtError::validation(format!(
                "column '{column}': list operands require IN or NOT | IN"
            ))),
            value => Ok((
                format!("{column} {token} ${}", base_index + 1),
                vec![value.clone()],
            )),
        }
    }
}

/// A parenthesized AND/OR group.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalConstraint {
    pub connector: Connector,
    pub children: Vec<Constraint>,
}

impl LogicalConstraint {
    /// Render the children joined by the connector, without the outer parentheses.
    pub(crate) fn build_inner(&self, base_index: usize) -> StmtResult<(String, Vec<Value>)> {
        if self.children.len() < 2 {
            return Err(StmtError::validation(format!(
                "{:?} group needs at least two constraints, got {}",
                self.connector,
                self.children.len()
            )));
        }

        let mut parts = Vec::with_capacity(self.children.len());
        let mut args = Vec::new();
        for child in &self.children {
            let (sql, child_args) = child.build(base_index + args.len())?;
            parts.push(sql);
            args.extend(child_args);
        }
        Ok((parts.join(self.connector.separator()), args))
    }
}

/// Node of a WHERE expression tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Constraint {
    /// No predicate set yet. Building it is an error.
    #[default]
    Empty,
    Column(ColumnConstraint),
    Logical(LogicalConstraint),
}

impl Constraint {
    /// `<column> <op> $n`, or `IS [NOT] NULL` / `IN (...)` depending on the value.
    pub fn field(
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        Constraint::Column(ColumnConstraint {
            column: column.into(),
            comparison,
            operand: Operand::Bind(value.into()),
        })
    }

    /// `<column> <op> <sql>` with `sql` spliced verbatim. Trusted callers only.
    pub fn raw(column: impl Into<String>, comparison: Comparison, sql: impl Into<String>) -> Self {
        Constraint::Column(ColumnConstraint {
            column: column.into(),
            comparison,
            operand: Operand::Raw(sql.into()),
        })
    }

    /// `<column> IN ($n, ...)`.
    pub fn is_in<T: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self::field(
            column,
            Comparison::IN,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// A logical group over `children`.
    pub fn logical(connector: Connector, children: impl IntoIterator<Item = Constraint>) -> Self {
        Constraint::Logical(LogicalConstraint {
            connector,
            children: children.into_iter().collect(),
        })
    }

    /// Whether this is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, Constraint::Empty)
    }

    /// Render this node with placeholders starting at `$<base_index + 1>`.
    ///
    /// Returns the SQL fragment and the values it consumed, in placeholder order.
    pub fn build(&self, base_index: usize) -> StmtResult<(String, Vec<Value>)> {
        match self {
            Constraint::Empty => Err(StmtError::validation(
                "WHERE clause has no constraint; set one with field() or expression()",
            )),
            Constraint::Column(column) => column.build(base_index),
            Constraint::Logical(group) => {
                let (sql, args) = group.build_inner(base_index)?;
                Ok((format!("({sql})"), args))
            }
        }
    }
}

/// AND group over two or more constraints.
pub fn and_expression(children: impl IntoIterator<Item = Constraint>) -> Constraint {
    Constraint::logical(Connector::And, children)
}

/// OR group over two or more constraints.
pub fn or_expression(children: impl IntoIterator<Item = Constraint>) -> Constraint {
    Constraint::logical(Connector::Or, children)
}
