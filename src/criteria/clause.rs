use chrono::NaiveDate;

use crate::{criteria::TableJoin, Scalar};

/// Equality operators, applicable to any comparable scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    Equal,
    NotEqual,
}

/// String-pattern operators. Values are wrapped in `%` wildcards at compile
/// time according to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Like,
    NotLike,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
}

/// Ordered-comparison operators for any ordered scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// Set-membership operators. Negated membership is intentionally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    In,
}

/// One typed filter condition bound to a parsed key reference.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    Equality { table: TableJoin, op: Equality, value: Scalar },
    Text { table: TableJoin, op: TextMatch, value: String },
    Numeric { table: TableJoin, op: Numeric, value: Scalar },
    Membership { table: TableJoin, op: Membership, values: Vec<Scalar> },
}

impl WhereClause {
    pub fn table(&self) -> &TableJoin {
        match self {
            WhereClause::Equality { table, .. } => table,
            WhereClause::Text { table, .. } => table,
            WhereClause::Numeric { table, .. } => table,
            WhereClause::Membership { table, .. } => table,
        }
    }
}

/// AND/OR relation between a clause and its immediate predecessor in
/// accumulation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

/// A clause tagged with its combinator. The first accumulated clause's
/// combinator is never consulted; there is no previous node to combine with.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryClause {
    pub combinator: Combinator,
    pub clause: WhereClause,
}

/// Selects the value family for one operator kind and applies its
/// meaningful-value guard. A guard failure drops the clause, it is never an
/// error; this is what lets optional filters compose without caller-side
/// null checks.
pub trait WhereOp: Copy {
    type Value;

    fn accepts(value: &Self::Value) -> bool;
    fn clause(self, table: TableJoin, value: Self::Value) -> WhereClause;
}

impl WhereOp for Equality {
    type Value = Scalar;

    fn accepts(_: &Scalar) -> bool {
        true
    }

    fn clause(self, table: TableJoin, value: Scalar) -> WhereClause {
        WhereClause::Equality { table, op: self, value }
    }
}

impl WhereOp for TextMatch {
    type Value = String;

    fn accepts(value: &String) -> bool {
        !value.trim().is_empty()
    }

    fn clause(self, table: TableJoin, value: String) -> WhereClause {
        WhereClause::Text { table, op: self, value }
    }
}

impl WhereOp for Numeric {
    type Value = Scalar;

    fn accepts(_: &Scalar) -> bool {
        true
    }

    fn clause(self, table: TableJoin, value: Scalar) -> WhereClause {
        WhereClause::Numeric { table, op: self, value }
    }
}

impl WhereOp for Membership {
    type Value = Vec<Scalar>;

    fn accepts(values: &Vec<Scalar>) -> bool {
        !values.is_empty()
    }

    fn clause(self, table: TableJoin, values: Vec<Scalar>) -> WhereClause {
        WhereClause::Membership { table, op: self, values }
    }
}

/// Adapts caller-side values into an operator's value family. `None` means
/// "no value given" and drops the clause before the guard even runs, so
/// `Option<_>` arguments compose directly.
pub trait ClauseArg<V> {
    fn into_value(self) -> Option<V>;
}

impl<V, T: ClauseArg<V>> ClauseArg<V> for Option<T> {
    fn into_value(self) -> Option<V> {
        self.and_then(ClauseArg::into_value)
    }
}

impl ClauseArg<Scalar> for Scalar {
    fn into_value(self) -> Option<Scalar> {
        Some(self)
    }
}

impl ClauseArg<Scalar> for &str {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for String {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for i64 {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for i32 {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for u32 {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for f64 {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for f32 {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for bool {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<Scalar> for NaiveDate {
    fn into_value(self) -> Option<Scalar> {
        Some(self.into())
    }
}

impl ClauseArg<String> for &str {
    fn into_value(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ClauseArg<String> for String {
    fn into_value(self) -> Option<String> {
        Some(self)
    }
}

impl<T: Into<Scalar>> ClauseArg<Vec<Scalar>> for Vec<T> {
    fn into_value(self) -> Option<Vec<Scalar>> {
        Some(self.into_iter().map(Into::into).collect())
    }
}
