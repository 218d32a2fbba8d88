use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    executor::Row,
    plan::{ColumnRef, CompareOp, Predicate},
};

/// Predicate evaluation over alias-prefixed rows.
///
/// Semantics are SQL-flavored but two-valued: a null or missing column never
/// matches, negated forms included.
pub struct Eval;

impl Eval {
    pub fn eval_predicate(predicate: &Predicate, row: &Row) -> bool {
        match predicate {
            Predicate::And(left, right) => {
                Self::eval_predicate(left, row) && Self::eval_predicate(right, row)
            }
            Predicate::Or(left, right) => {
                Self::eval_predicate(left, row) || Self::eval_predicate(right, row)
            }
            Predicate::Compare { column, op, value } => {
                let actual = Self::column_value(column, row);
                if actual.is_null() {
                    return false;
                }
                match op {
                    CompareOp::Eq => Self::value_equal(actual, value),
                    CompareOp::NotEq => !Self::value_equal(actual, value),
                    CompareOp::Lt => Self::cmp_values(actual, value) == Some(Ordering::Less),
                    CompareOp::LtEq => matches!(
                        Self::cmp_values(actual, value),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                    CompareOp::Gt => Self::cmp_values(actual, value) == Some(Ordering::Greater),
                    CompareOp::GtEq => matches!(
                        Self::cmp_values(actual, value),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                }
            }
            Predicate::Match { column, pattern, negated } => {
                match Self::column_value(column, row) {
                    Value::String(s) => {
                        let matched = Self::eval_like(s, pattern);
                        if *negated { !matched } else { matched }
                    }
                    _ => false,
                }
            }
            Predicate::InSet { column, values } => {
                let actual = Self::column_value(column, row);
                if actual.is_null() {
                    return false;
                }
                values.iter().any(|v| Self::value_equal(actual, v))
            }
        }
    }

    fn column_value<'a>(column: &ColumnRef, row: &'a Row) -> &'a Value {
        row.get(&column.row_key()).unwrap_or(&Value::Null)
    }

    /// Equality across the value space rows live in: numbers compare as
    /// f64, everything else by kind.
    pub fn value_equal(a: &Value, b: &Value) -> bool {
        use serde_json::Value::*;
        match (a, b) {
            (Null, _) | (_, Null) => false,
            (Bool(x), Bool(y)) => x == y,
            (Number(x), Number(y)) => x.as_f64() == y.as_f64(),
            (String(x), String(y)) => x == y,
            _ => false,
        }
    }

    /// Ordering across comparable values. Strings that both parse as ISO
    /// dates compare as dates; mixed kinds are incomparable.
    pub fn cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
        use serde_json::Value::*;
        match (a, b) {
            (Number(x), Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
            (String(x), String(y)) => {
                let dx = NaiveDate::parse_from_str(x, "%Y-%m-%d");
                let dy = NaiveDate::parse_from_str(y, "%Y-%m-%d");
                match (dx, dy) {
                    (Ok(dx), Ok(dy)) => Some(dx.cmp(&dy)),
                    _ => Some(x.cmp(y)),
                }
            }
            (Bool(x), Bool(y)) => Some(x.cmp(y)),
            _ => None,
        }
    }

    /// SQL LIKE: `%` matches any run, `_` one character (no escapes).
    pub fn eval_like(value: &str, pattern: &str) -> bool {
        let mut regex = String::from("^");
        for ch in pattern.chars() {
            match ch {
                '%' => regex.push_str(".*"),
                '_' => regex.push('.'),
                // naive escaping of regex meta
                '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' | '*' | '?' => {
                    regex.push('\\');
                    regex.push(ch);
                }
                c => regex.push(c),
            }
        }
        regex.push('$');
        regex::Regex::new(&regex).map(|re| re.is_match(value)).unwrap_or(false)
    }

    /// NULLS LAST comparator for paged sorting; `ascending` flips only the
    /// non-null ordering.
    pub fn cmp_for_sort(a: &Value, b: &Value, ascending: bool) -> Ordering {
        use serde_json::Value::*;
        use std::cmp::Ordering::*;
        match (a, b) {
            (Null, Null) => Equal,
            (Null, _) => Greater, // null after non-null
            (_, Null) => Less,
            _ => {
                let ord = Self::cmp_values(a, b).unwrap_or(Equal);
                if ascending { ord } else { ord.reverse() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        let mut m = Row::new();
        for (k, v) in pairs {
            m.insert((*k).to_string(), v.clone());
        }
        m
    }

    fn col(alias: &str, column: &str) -> ColumnRef {
        ColumnRef { alias: alias.into(), column: column.into() }
    }

    #[test]
    fn compare_eq_and_cross_numeric() {
        let r = row(&[("o.total", json!(10))]);
        let p = Predicate::Compare { column: col("o", "total"), op: CompareOp::Eq, value: json!(10.0) };
        assert!(Eval::eval_predicate(&p, &r));

        let p = Predicate::Compare { column: col("o", "total"), op: CompareOp::Gt, value: json!(9.5) };
        assert!(Eval::eval_predicate(&p, &r));
    }

    #[test]
    fn null_or_missing_never_matches_even_negated() {
        let r = row(&[("o.status", Value::Null)]);
        let not_eq = Predicate::Compare { column: col("o", "status"), op: CompareOp::NotEq, value: json!("PAID") };
        assert!(!Eval::eval_predicate(&not_eq, &r));

        let missing = Predicate::Compare { column: col("o", "nope"), op: CompareOp::NotEq, value: json!(1) };
        assert!(!Eval::eval_predicate(&missing, &r));

        let not_like = Predicate::Match { column: col("o", "status"), pattern: "%x%".into(), negated: true };
        assert!(!Eval::eval_predicate(&not_like, &r));
    }

    #[test]
    fn iso_date_strings_compare_as_dates() {
        let a = json!("2024-02-09");
        let b = json!("2024-10-01");
        assert_eq!(Eval::cmp_values(&a, &b), Some(Ordering::Less));
    }

    #[test]
    fn like_translation_handles_wildcards_and_meta() {
        assert!(Eval::eval_like("Ana Maria", "%Maria"));
        assert!(Eval::eval_like("Ana Maria", "Ana%"));
        assert!(Eval::eval_like("Ana", "A_a"));
        assert!(!Eval::eval_like("Ana", "B%"));
        // regex meta in the pattern is literal
        assert!(Eval::eval_like("a.b", "a.b"));
        assert!(!Eval::eval_like("axb", "a.b"));
    }

    #[test]
    fn match_negation_flips_only_non_null_values() {
        let r = row(&[("c.name", json!("Ana"))]);
        let like = Predicate::Match { column: col("c", "name"), pattern: "%An%".into(), negated: false };
        assert!(Eval::eval_predicate(&like, &r));
        let not_like = Predicate::Match { column: col("c", "name"), pattern: "%An%".into(), negated: true };
        assert!(!Eval::eval_predicate(&not_like, &r));
    }

    #[test]
    fn in_set_matches_membership() {
        let r = row(&[("o.status", json!("SHIPPED"))]);
        let p = Predicate::InSet {
            column: col("o", "status"),
            values: vec![json!("PAID"), json!("SHIPPED")],
        };
        assert!(Eval::eval_predicate(&p, &r));

        let p = Predicate::InSet { column: col("o", "status"), values: vec![json!("PAID")] };
        assert!(!Eval::eval_predicate(&p, &r));
    }

    #[test]
    fn and_or_combine_short_circuit_values() {
        let r = row(&[("c.id", json!(1)), ("c.name", json!("Ana"))]);
        let id_eq = Predicate::Compare { column: col("c", "id"), op: CompareOp::Eq, value: json!(1) };
        let name_eq = Predicate::Compare { column: col("c", "name"), op: CompareOp::Eq, value: json!("Bob") };

        let and = Predicate::And(Box::new(id_eq.clone()), Box::new(name_eq.clone()));
        assert!(!Eval::eval_predicate(&and, &r));

        let or = Predicate::Or(Box::new(id_eq), Box::new(name_eq));
        assert!(Eval::eval_predicate(&or, &r));
    }

    #[test]
    fn sort_comparator_puts_nulls_last_both_directions() {
        use std::cmp::Ordering::*;
        let n = Value::Null;
        let z = json!(0);
        assert_eq!(Eval::cmp_for_sort(&z, &n, true), Less);
        assert_eq!(Eval::cmp_for_sort(&n, &z, true), Greater);
        assert_eq!(Eval::cmp_for_sort(&z, &n, false), Less);
        assert_eq!(Eval::cmp_for_sort(&json!(1), &json!(2), false), Greater);
    }
}
