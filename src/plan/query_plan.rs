use indexmap::IndexMap;

use crate::plan::{PageRequest, Predicate};

/// The relation edge one join node travels through, as declared on the
/// parent entity's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEdge {
    /// Relation field on the parent entity.
    pub field: String,
    /// Physical foreign-key column override, when the field declares one.
    pub column: Option<String>,
    /// Multi-valued edge (the foreign key lives on the child side).
    pub multi: bool,
}

/// One realized join handle. The root node has no parent and no edge; every
/// other node chains onto the alias declared immediately before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinNode {
    pub alias: String,
    pub entity: &'static str,
    pub table: String,
    pub parent: Option<String>,
    pub via: Option<JoinEdge>,
}

impl JoinNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// One scalar field selected from the root entity: logical field name and
/// the physical column it reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectField {
    pub field: String,
    pub column: String,
}

/// The resolved, backend-agnostic query descriptor: everything a backend
/// needs to fetch, count or probe. Built fresh on every execution call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Ordered alias -> join handle map; first entry is the root.
    pub joins: IndexMap<String, JoinNode>,
    pub predicate: Option<Predicate>,
    pub fields: Vec<SelectField>,
    pub page: Option<PageRequest>,
}

impl QueryPlan {
    pub fn root(&self) -> Option<&JoinNode> {
        self.joins.values().next()
    }
}
