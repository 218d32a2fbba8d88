use tracing::trace;

use crate::{
    criteria::{Combinator, Equality, JoinGraph, Numeric, QueryClause, TableJoin, TextMatch, WhereClause},
    plan::{ColumnRef, CompareOp, Predicate},
    schema::SchemaRegistry,
    QueryError, Result,
};

/// Compiles the accumulated clause sequence into one predicate tree.
pub struct ClauseCompiler;

impl ClauseCompiler {
    /// Strict left-to-right fold with no precedence grouping: each clause
    /// combines with everything folded before it, so `a OR b AND c` compiles
    /// as `AND(OR(a, b), c)`. Callers needing different grouping must split
    /// into separate criteria. Zero clauses compile to no predicate at all.
    pub fn compile(
        clauses: &[QueryClause],
        graph: &JoinGraph,
        registry: &SchemaRegistry,
    ) -> Result<Option<Predicate>> {
        let mut folded: Option<Predicate> = None;
        for query_clause in clauses {
            let leaf = Self::leaf(&query_clause.clause, graph, registry)?;
            folded = Some(match folded {
                None => leaf,
                Some(expr) => match query_clause.combinator {
                    Combinator::And => Predicate::And(Box::new(expr), Box::new(leaf)),
                    Combinator::Or => Predicate::Or(Box::new(expr), Box::new(leaf)),
                },
            });
        }
        trace!(clauses = clauses.len(), "compiled predicate tree");
        Ok(folded)
    }

    fn leaf(clause: &WhereClause, graph: &JoinGraph, registry: &SchemaRegistry) -> Result<Predicate> {
        let column = Self::column_ref(clause.table(), graph, registry)?;

        Ok(match clause {
            WhereClause::Equality { op, value, .. } => Predicate::Compare {
                column,
                op: match op {
                    Equality::Equal => CompareOp::Eq,
                    Equality::NotEqual => CompareOp::NotEq,
                },
                value: value.to_json(),
            },
            WhereClause::Text { op, value, .. } => {
                let (pattern, negated) = Self::pattern_of(*op, value);
                Predicate::Match { column, pattern, negated }
            }
            WhereClause::Numeric { op, value, .. } => Predicate::Compare {
                column,
                op: match op {
                    Numeric::LessThan => CompareOp::Lt,
                    Numeric::LessThanOrEqual => CompareOp::LtEq,
                    Numeric::GreaterThan => CompareOp::Gt,
                    Numeric::GreaterThanOrEqual => CompareOp::GtEq,
                },
                value: value.to_json(),
            },
            WhereClause::Membership { values, .. } => Predicate::InSet {
                column,
                values: values.iter().map(|v| v.to_json()).collect(),
            },
        })
    }

    /// Resolves a parsed key against the graph and the schema: the alias
    /// defaults to the root, the column token canonicalizes to the target
    /// entity's field, and the emitted reference carries the physical column.
    fn column_ref(table: &TableJoin, graph: &JoinGraph, registry: &SchemaRegistry) -> Result<ColumnRef> {
        let root_alias = graph
            .root()
            .map(|r| r.alias.clone())
            .ok_or_else(|| QueryError::Schema("no root table declared".to_string()))?;

        let alias = table.alias_or(&root_alias).to_string();
        let point = graph.point_for(&alias)?;
        let schema = registry.schema_of(point.entity)?;

        let field = schema
            .resolve_column(&table.column)
            .ok_or_else(|| QueryError::UnknownColumn {
                entity: point.entity.name.to_string(),
                column: table.column.clone(),
            })?;

        Ok(ColumnRef { alias, column: schema.column_of(field).to_string() })
    }

    fn pattern_of(op: TextMatch, value: &str) -> (String, bool) {
        match op {
            TextMatch::Like => (format!("%{}%", value), false),
            TextMatch::NotLike => (format!("%{}%", value), true),
            TextMatch::StartsWith => (format!("{}%", value), false),
            TextMatch::NotStartsWith => (format!("{}%", value), true),
            TextMatch::EndsWith => (format!("%{}", value), false),
            TextMatch::NotEndsWith => (format!("%{}", value), true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        criteria::{Equality, JoinPoint, Membership, Numeric, WhereOp},
        schema::{Entity, EntityId, EntitySchema, FieldDef, ScalarKind},
        Scalar,
    };
    use serde_json::json;

    struct Customer;
    struct Order;

    impl Entity for Customer {
        const NAME: &'static str = "Customer";
        fn schema() -> EntitySchema {
            EntitySchema::new("Customer", "customers")
                .field("id", FieldDef::scalar(ScalarKind::Int))
                .field("name", FieldDef::scalar(ScalarKind::Str))
                .field("orders", FieldDef::relation_many(EntityId::of::<Order>()))
        }
    }

    impl Entity for Order {
        const NAME: &'static str = "Order";
        fn schema() -> EntitySchema {
            EntitySchema::new("Order", "orders")
                .field("id", FieldDef::scalar(ScalarKind::Int))
                .field("status", FieldDef::scalar(ScalarKind::Str))
                .field("createdAt", FieldDef::scalar_as(ScalarKind::Date, "created_at"))
        }
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new().register::<Customer>().register::<Order>()
    }

    fn graph() -> JoinGraph {
        let mut g = JoinGraph::with_root(JoinPoint::new(EntityId::of::<Customer>(), "c"));
        g.declare_join(JoinPoint::new(EntityId::of::<Order>(), "o")).unwrap();
        g
    }

    fn tagged<O: WhereOp>(combinator: Combinator, key: &str, op: O, value: O::Value) -> QueryClause {
        QueryClause { combinator, clause: op.clause(TableJoin::of(key), value) }
    }

    #[test]
    fn zero_clauses_compile_to_no_predicate() {
        let out = ClauseCompiler::compile(&[], &graph(), &registry()).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn one_clause_compiles_to_its_own_leaf() {
        let clauses = vec![tagged(Combinator::And, "o.status", Equality::Equal, "PAID".into())];
        let out = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap().unwrap();
        assert_eq!(out, Predicate::Compare {
            column: ColumnRef { alias: "o".into(), column: "status".into() },
            op: CompareOp::Eq,
            value: json!("PAID"),
        });
    }

    #[test]
    fn fold_is_strictly_left_to_right_without_grouping() {
        // [A(and), B(or), C(and)] must fold as AND(OR(A, B), C).
        let clauses = vec![
            tagged(Combinator::And, "name", Equality::Equal, "Ana".into()),
            tagged(Combinator::Or, "name", Equality::Equal, "Bob".into()),
            tagged(Combinator::And, "id", Numeric::GreaterThan, Scalar::Int(10)),
        ];
        let out = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap().unwrap();

        let name = |value: &str| Predicate::Compare {
            column: ColumnRef { alias: "c".into(), column: "name".into() },
            op: CompareOp::Eq,
            value: json!(value),
        };
        let id_gt = Predicate::Compare {
            column: ColumnRef { alias: "c".into(), column: "id".into() },
            op: CompareOp::Gt,
            value: json!(10),
        };
        let expected = Predicate::And(
            Box::new(Predicate::Or(Box::new(name("Ana")), Box::new(name("Bob")))),
            Box::new(id_gt),
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn bare_keys_default_to_the_root_alias() {
        let clauses = vec![tagged(Combinator::And, "name", Equality::Equal, "Ana".into())];
        let out = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap().unwrap();
        assert!(matches!(
            out,
            Predicate::Compare { column: ColumnRef { ref alias, .. }, .. } if alias == "c"
        ));
    }

    #[test]
    fn canonical_column_rewrite_emits_the_physical_name() {
        let clauses = vec![tagged(Combinator::And, "o.createdAt", Equality::Equal, "2024-01-01".into())];
        let out = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap().unwrap();
        assert!(matches!(
            out,
            Predicate::Compare { column: ColumnRef { ref column, .. }, .. } if column == "created_at"
        ));

        // The caller may also write the physical name directly.
        let clauses = vec![tagged(Combinator::And, "o.created_at", Equality::Equal, "2024-01-01".into())];
        let out = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap().unwrap();
        assert!(matches!(
            out,
            Predicate::Compare { column: ColumnRef { ref column, .. }, .. } if column == "created_at"
        ));
    }

    #[test]
    fn text_operators_wrap_patterns_per_side() {
        let cases = [
            (TextMatch::Like, "%ana%", false),
            (TextMatch::NotLike, "%ana%", true),
            (TextMatch::StartsWith, "ana%", false),
            (TextMatch::NotStartsWith, "ana%", true),
            (TextMatch::EndsWith, "%ana", false),
            (TextMatch::NotEndsWith, "%ana", true),
        ];
        for (op, expected_pattern, expected_negated) in cases {
            let clauses = vec![tagged(Combinator::And, "name", op, "ana".to_string())];
            let out = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap().unwrap();
            match out {
                Predicate::Match { pattern, negated, .. } => {
                    assert_eq!(pattern, expected_pattern);
                    assert_eq!(negated, expected_negated);
                }
                other => panic!("expected Match, got {:?}", other),
            }
        }
    }

    #[test]
    fn membership_compiles_to_in_set() {
        let clauses = vec![tagged(
            Combinator::And,
            "o.status",
            Membership::In,
            vec![Scalar::from("PAID"), Scalar::from("SHIPPED")],
        )];
        let out = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap().unwrap();
        assert_eq!(out, Predicate::InSet {
            column: ColumnRef { alias: "o".into(), column: "status".into() },
            values: vec![json!("PAID"), json!("SHIPPED")],
        });
    }

    #[test]
    fn unknown_alias_surfaces_at_compile_time() {
        let clauses = vec![tagged(Combinator::And, "x.status", Equality::Equal, "PAID".into())];
        let err = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap_err();
        assert_eq!(err, QueryError::UnknownTable("x".to_string()));
    }

    #[test]
    fn unknown_column_names_the_entity() {
        let clauses = vec![tagged(Combinator::And, "o.missing", Equality::Equal, "x".into())];
        let err = ClauseCompiler::compile(&clauses, &graph(), &registry()).unwrap_err();
        assert_eq!(err, QueryError::UnknownColumn {
            entity: "Order".to_string(),
            column: "missing".to_string(),
        });
    }
}
