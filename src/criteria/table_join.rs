/// A parsed predicate key: optional join alias plus a column token.
///
/// Built from dotted keys like `"orders.status"`; a bare `"status"` leaves
/// the alias unset and defaults to the graph's root at compile time, since
/// clauses may be declared before all joins are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableJoin {
    pub alias: Option<String>,
    pub column: String,
}

const SEPARATOR: char = '.';

impl TableJoin {
    /// Splits on the first `.`; no separator means the whole key is the
    /// column and the alias stays unset.
    pub fn of(key: &str) -> Self {
        match key.split_once(SEPARATOR) {
            Some((alias, column)) => Self {
                alias: Some(alias.to_string()),
                column: column.to_string(),
            },
            None => Self { alias: None, column: key.to_string() },
        }
    }

    /// The alias, or `fallback` when unset or blank.
    pub fn alias_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match &self.alias {
            Some(alias) if !alias.trim().is_empty() => alias,
            _ => fallback,
        }
    }

    /// Rewrites the column to its canonical schema name once resolved.
    pub fn with_column(self, column: &str) -> Self {
        Self { alias: self.alias, column: column.to_string() }
    }
}
