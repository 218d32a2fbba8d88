use std::{collections::HashSet, fmt, hash::Hash, marker::PhantomData};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    criteria::{ClauseArg, ClauseCompiler, Combinator, JoinGraph, JoinPoint, QueryClause, TableJoin, WhereOp},
    executor::ExecutionBackend,
    mapper,
    plan::{Page, PageRequest, QueryPlan},
    schema::{Entity, EntityId, FieldKind, SchemaRegistry},
    QueryError, Result,
};

/// Fluent criteria assembler: declare a root and joins, accumulate typed
/// predicate clauses, then execute against a backend. `T` is the result
/// type rows are materialized into; the root entity may be a different type.
///
/// One instance serves one query build: declare, filter, execute, drop.
/// Every execution call re-resolves the join graph and recompiles the
/// predicate, so the same criteria can run twice, at the cost of redoing
/// that work.
///
/// Mixing `and` and `or` folds strictly left to right with no grouping:
/// `a OR b AND c` means `(a OR b) AND c`. Split into separate criteria when
/// different grouping is needed.
pub struct SearchCriteria<'a, T> {
    registry: &'a SchemaRegistry,
    backend: &'a dyn ExecutionBackend,
    graph: JoinGraph,
    clauses: Vec<QueryClause>,
    page: Option<PageRequest>,
    _result: PhantomData<fn() -> T>,
}

// Hand-written: the backend is a trait object with no `Debug` bound.
impl<T> fmt::Debug for SearchCriteria<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCriteria")
            .field("graph", &self.graph)
            .field("clauses", &self.clauses)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl<'a, T> SearchCriteria<'a, T> {
    /// Starts a criteria with no root declared; follow with one of the
    /// `from` family.
    pub fn select(registry: &'a SchemaRegistry, backend: &'a dyn ExecutionBackend) -> Self {
        Self {
            registry,
            backend,
            graph: JoinGraph::new(),
            clauses: Vec::new(),
            page: None,
            _result: PhantomData,
        }
    }

    /// Starts a criteria whose result type doubles as the root entity,
    /// aliased by its table name.
    pub fn select_from(registry: &'a SchemaRegistry, backend: &'a dyn ExecutionBackend) -> Self
    where
        T: Entity,
    {
        let table = T::schema().table;
        Self {
            registry,
            backend,
            graph: JoinGraph::with_root(JoinPoint::new(EntityId::of::<T>(), &table)),
            clauses: Vec::new(),
            page: None,
            _result: PhantomData,
        }
    }

    // --- root and join declaration -------------------------------------

    pub fn from<R: Entity>(self) -> Result<Self> {
        let table = R::schema().table;
        self.from_point(JoinPoint::new(EntityId::of::<R>(), &table))
    }

    pub fn from_as<R: Entity>(self, alias: &str) -> Result<Self> {
        self.from_point(JoinPoint::new(EntityId::of::<R>(), alias))
    }

    pub fn from_table(self, table: &str) -> Result<Self> {
        self.from_table_as(table, table)
    }

    pub fn from_table_as(self, table: &str, alias: &str) -> Result<Self> {
        let entity = self
            .registry
            .entity_by_table(table)
            .ok_or_else(|| QueryError::UnknownTable(table.to_string()))?;
        self.from_point(JoinPoint::new(entity, alias))
    }

    fn from_point(mut self, point: JoinPoint) -> Result<Self> {
        self.graph.declare_root(point)?;
        Ok(self)
    }

    pub fn join<E: Entity>(self) -> Result<Self> {
        let table = E::schema().table;
        self.join_point(JoinPoint::new(EntityId::of::<E>(), &table))
    }

    pub fn join_as<E: Entity>(self, alias: &str) -> Result<Self> {
        self.join_point(JoinPoint::new(EntityId::of::<E>(), alias))
    }

    pub fn join_table(self, key: &str) -> Result<Self> {
        self.join_table_as(key, key)
    }

    /// String-keyed join: the key is first tried as a registered table name,
    /// then as a relation field of the most recently declared point (by
    /// field name, foreign-key column, or join-table name).
    pub fn join_table_as(self, key: &str, alias: &str) -> Result<Self> {
        if let Some(entity) = self.registry.entity_by_table(key) {
            return self.join_point(JoinPoint::new(entity, alias));
        }

        let last = self
            .graph
            .last()
            .ok_or_else(|| QueryError::Schema("no root table declared".to_string()))?;
        let schema = self.registry.schema_of(last.entity)?;

        let (field, def) = schema
            .relation_named(key)
            .ok_or_else(|| QueryError::UnknownTable(key.to_string()))?;
        let target = match def.kind {
            FieldKind::Relation { target, .. } => target,
            FieldKind::Scalar(_) => return Err(QueryError::UnknownTable(key.to_string())),
        };
        let point = JoinPoint::through(target, alias, field);
        self.join_point(point)
    }

    fn join_point(mut self, point: JoinPoint) -> Result<Self> {
        self.graph.declare_join(point)?;
        Ok(self)
    }

    // --- predicate accumulation ----------------------------------------

    /// Adds one AND-combined clause. A missing, blank or empty value drops
    /// the clause silently, so optional filters compose without caller-side
    /// checks. Keys referencing joins declared later are accepted here and
    /// resolved at execution time.
    pub fn where_<O: WhereOp>(self, key: &str, op: O, value: impl ClauseArg<O::Value>) -> Self {
        self.push_clause(Combinator::And, key, op, value)
    }

    /// Same as `where_`; reads better after the first clause.
    pub fn and<O: WhereOp>(self, key: &str, op: O, value: impl ClauseArg<O::Value>) -> Self {
        self.push_clause(Combinator::And, key, op, value)
    }

    /// Adds one OR-combined clause (relative to everything folded so far).
    pub fn or<O: WhereOp>(self, key: &str, op: O, value: impl ClauseArg<O::Value>) -> Self {
        self.push_clause(Combinator::Or, key, op, value)
    }

    fn push_clause<O: WhereOp>(
        mut self,
        combinator: Combinator,
        key: &str,
        op: O,
        value: impl ClauseArg<O::Value>,
    ) -> Self {
        let Some(value) = value.into_value() else {
            return self;
        };
        if !O::accepts(&value) {
            return self;
        }
        let clause = op.clause(TableJoin::of(key), value);
        self.clauses.push(QueryClause { combinator, clause });
        self
    }

    // --- pagination -----------------------------------------------------

    /// 1-based page number; values below 1 clamp so the offset never goes
    /// negative.
    pub fn with_page(self, number: u32, size: u32, order_by: &str, ascending: bool) -> Self {
        self.with_page_request(PageRequest::of(number, size, order_by, ascending))
    }

    pub fn with_page_request(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }
}

impl<T: Entity + DeserializeOwned> SearchCriteria<'_, T> {
    fn build_plan(&self, page: Option<PageRequest>) -> Result<QueryPlan> {
        let fields = T::schema().select_fields();
        let joins = self.graph.realize(self.registry)?;
        let predicate = ClauseCompiler::compile(&self.clauses, &self.graph, self.registry)?;
        Ok(QueryPlan { joins, predicate, fields, page })
    }

    /// Unpaged fetch of every matching row, in backend iteration order.
    pub fn to_list(&self) -> Result<Vec<T>> {
        let plan = self.build_plan(None)?;
        debug!(clauses = self.clauses.len(), "executing list");
        let rows = self.backend.fetch(&plan)?;
        rows.into_iter().map(mapper::materialize).collect()
    }

    /// `to_list` collected into a set; join fan-out duplicates collapse.
    pub fn to_set(&self) -> Result<HashSet<T>>
    where
        T: Eq + Hash,
    {
        Ok(self.to_list()?.into_iter().collect())
    }

    /// Bounded fetch plus a separate total count. Fails with
    /// `PaginationMissing` unless `with_page` was called.
    pub fn to_page(&self) -> Result<Page<T>> {
        let page = self.page.clone().ok_or(QueryError::PaginationMissing)?;

        let plan = self.build_plan(Some(page.clone()))?;
        debug!(number = page.number, size = page.size, "executing page");
        let rows = self.backend.fetch(&plan)?;
        let items = rows.into_iter().map(mapper::materialize).collect::<Result<Vec<T>>>()?;

        let total = self.backend.count(&self.build_plan(None)?)?;
        Ok(Page { items, number: page.number, size: page.size, total })
    }

    /// Fetch-one semantics: `None` when nothing matches, never an error.
    pub fn find_first(&self) -> Result<Option<T>> {
        let plan = self.build_plan(Some(PageRequest::first()))?;
        let rows = self.backend.fetch(&plan)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(mapper::materialize(row)?)),
            None => Ok(None),
        }
    }

    /// Count-only projection of the current criteria.
    pub fn count(&self) -> Result<u64> {
        let plan = self.build_plan(None)?;
        self.backend.count(&plan)
    }

    /// Bounded existence check; the backend stops at the first matching row.
    pub fn exists_any(&self) -> Result<bool> {
        let plan = self.build_plan(None)?;
        self.backend.exists(&plan)
    }
}
