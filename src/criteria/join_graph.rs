use indexmap::IndexMap;
use tracing::debug;

use crate::{
    plan::{JoinEdge, JoinNode},
    schema::{EntityId, FieldKind, SchemaRegistry},
    QueryError, Result,
};

/// One declared table reference: a unique alias, the entity it stands for,
/// and an optional explicit connecting field when the relation can't be
/// inferred from the previous point's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPoint {
    pub alias: String,
    pub entity: EntityId,
    pub via: Option<String>,
}

impl JoinPoint {
    pub fn new(entity: EntityId, alias: &str) -> Self {
        Self { alias: alias.to_string(), entity, via: None }
    }

    pub fn through(entity: EntityId, alias: &str, field: &str) -> Self {
        Self { alias: alias.to_string(), entity, via: Some(field.to_string()) }
    }
}

/// Append-only sequence of join points rooted at exactly one `from` entity.
///
/// Connectivity is positional: each join point chains onto the immediately
/// preceding declared point, so callers must declare joins in the order they
/// chain. `realize` rebinds the chain to fresh handles on every execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinGraph {
    root: Option<JoinPoint>,
    joins: Vec<JoinPoint>,
}

impl JoinGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(point: JoinPoint) -> Self {
        Self { root: Some(point), joins: Vec::new() }
    }

    pub fn root(&self) -> Option<&JoinPoint> {
        self.root.as_ref()
    }

    /// The most recently declared point; string-keyed joins probe its schema.
    pub fn last(&self) -> Option<&JoinPoint> {
        self.joins.last().or(self.root.as_ref())
    }

    pub fn declare_root(&mut self, point: JoinPoint) -> Result<()> {
        if self.root.is_some() || self.has_alias(&point.alias) {
            return Err(QueryError::DuplicateAlias(point.alias));
        }
        self.root = Some(point);
        Ok(())
    }

    /// Joins chain onto the previously declared point, so the root must be
    /// declared before the first join.
    pub fn declare_join(&mut self, point: JoinPoint) -> Result<()> {
        if self.root.is_none() {
            return Err(QueryError::Schema("no root table declared".to_string()));
        }
        if self.has_alias(&point.alias) {
            return Err(QueryError::DuplicateAlias(point.alias));
        }
        self.joins.push(point);
        Ok(())
    }

    fn has_alias(&self, alias: &str) -> bool {
        self.root.as_ref().is_some_and(|r| r.alias == alias)
            || self.joins.iter().any(|j| j.alias == alias)
    }

    /// Resolves an alias to its declared point. A blank alias resolves to
    /// the root.
    pub fn point_for(&self, alias: &str) -> Result<&JoinPoint> {
        if alias.trim().is_empty() {
            return self
                .root
                .as_ref()
                .ok_or_else(|| QueryError::Schema("no root table declared".to_string()));
        }
        if let Some(root) = &self.root {
            if root.alias == alias {
                return Ok(root);
            }
        }
        self.joins
            .iter()
            .find(|j| j.alias == alias)
            .ok_or_else(|| QueryError::UnknownTable(alias.to_string()))
    }

    /// Walks the declared chain and binds one `JoinNode` per alias: the root
    /// first with no parent, then each point connected to its predecessor
    /// through the explicit field when stored, else the first relation field
    /// of the predecessor's type targeting the new point's entity.
    pub fn realize(&self, registry: &SchemaRegistry) -> Result<IndexMap<String, JoinNode>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| QueryError::Schema("no root table declared".to_string()))?;

        let mut nodes = IndexMap::new();
        let root_schema = registry.schema_of(root.entity)?;
        nodes.insert(root.alias.clone(), JoinNode {
            alias: root.alias.clone(),
            entity: root.entity.name,
            table: root_schema.table.clone(),
            parent: None,
            via: None,
        });

        let mut prev = root;
        for point in &self.joins {
            let prev_schema = registry.schema_of(prev.entity)?;
            let field_name = match &point.via {
                Some(field) => field.clone(),
                None => prev_schema
                    .join_field_to(point.entity)
                    .map(|(name, _)| name.to_string())
                    .ok_or_else(|| QueryError::JoinResolution {
                        from: prev.entity.name.to_string(),
                        to: point.entity.name.to_string(),
                    })?,
            };

            let def = prev_schema.get(&field_name).ok_or_else(|| QueryError::JoinResolution {
                from: prev.entity.name.to_string(),
                to: point.entity.name.to_string(),
            })?;
            let multi = matches!(def.kind, FieldKind::Relation { multi: true, .. });

            let schema = registry.schema_of(point.entity)?;
            nodes.insert(point.alias.clone(), JoinNode {
                alias: point.alias.clone(),
                entity: point.entity.name,
                table: schema.table.clone(),
                parent: Some(prev.alias.clone()),
                via: Some(JoinEdge {
                    field: field_name,
                    column: def.column.map(str::to_string),
                    multi,
                }),
            });
            prev = point;
        }

        debug!(aliases = nodes.len(), root = %root.alias, "realized join graph");
        Ok(nodes)
    }
}
