use crate::schema::EntityId;

/// Primitive type carried by a scalar column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Date,
}

/// What a declared field maps to: a plain column or an edge to another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Relation {
        target: EntityId,
        /// Multi-valued edge (a collection of `target` on this side).
        multi: bool,
        /// Physical join-table name, when the mapping declares one.
        join_table: Option<&'static str>,
    },
}

/// One declared field of an entity: its kind plus an optional physical column
/// name when it differs from the field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub kind: FieldKind,
    pub column: Option<&'static str>,
}

impl FieldDef {
    pub fn scalar(kind: ScalarKind) -> Self {
        Self { kind: FieldKind::Scalar(kind), column: None }
    }

    /// Scalar field stored under a different physical column name.
    pub fn scalar_as(kind: ScalarKind, column: &'static str) -> Self {
        Self { kind: FieldKind::Scalar(kind), column: Some(column) }
    }

    /// Single-valued edge to `target`.
    pub fn relation(target: EntityId) -> Self {
        Self { kind: FieldKind::Relation { target, multi: false, join_table: None }, column: None }
    }

    /// Single-valued edge to `target` with an explicit foreign-key column.
    pub fn relation_as(target: EntityId, column: &'static str) -> Self {
        Self {
            kind: FieldKind::Relation { target, multi: false, join_table: None },
            column: Some(column),
        }
    }

    /// Multi-valued edge to `target` (one-to-many / many-to-many).
    pub fn relation_many(target: EntityId) -> Self {
        Self { kind: FieldKind::Relation { target, multi: true, join_table: None }, column: None }
    }

    /// Multi-valued edge mapped through a named join table.
    pub fn relation_many_via(target: EntityId, join_table: &'static str) -> Self {
        Self {
            kind: FieldKind::Relation { target, multi: true, join_table: Some(join_table) },
            column: None,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation { .. })
    }

    /// Target entity of a relation field, `None` for scalars.
    pub fn relation_target(&self) -> Option<EntityId> {
        match self.kind {
            FieldKind::Relation { target, .. } => Some(target),
            FieldKind::Scalar(_) => None,
        }
    }
}
