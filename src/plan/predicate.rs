use serde_json::Value;

/// A resolved column target: the join alias it is scoped to plus the
/// physical column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
}

impl ColumnRef {
    /// Key the column resolves to in an alias-prefixed row.
    pub fn row_key(&self) -> String {
        format!("{}.{}", self.alias, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Compiled boolean filter tree handed to the execution backend.
///
/// The tree shape is exactly the caller's clause accumulation order folded
/// left to right; no reordering or grouping happens after compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare { column: ColumnRef, op: CompareOp, value: Value },
    /// SQL LIKE semantics: `%` matches any run, `_` one character.
    Match { column: ColumnRef, pattern: String, negated: bool },
    InSet { column: ColumnRef, values: Vec<Value> },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}
