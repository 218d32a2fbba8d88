use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::{
    executor::{Eval, ExecutionBackend, Row},
    plan::{JoinNode, Predicate, QueryPlan},
    QueryError, Result,
};

/// Strategy used for generating row ids in a memory table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub enum IdType {
    /// Use UUID string values as ids (default).
    #[default]
    Uuid,
    /// Use integer ids generated sequentially.
    Int,
    /// No automatic id generation; rows keep whatever the caller provided.
    None,
}

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    rows: Vec<Map<String, Value>>,
    id_type: IdType,
    next_id: u64,
}

/// In-memory reference backend: insertion-ordered JSON tables joined by
/// foreign-key convention. Meant for tests and prototyping; a real store
/// implements `ExecutionBackend` against its own engine.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: IndexMap<String, MemoryTable>,
    id_key: String,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self { tables: IndexMap::new(), id_key: "id".to_string() }
    }

    pub fn with_id_key(id_key: &str) -> Self {
        Self { tables: IndexMap::new(), id_key: id_key.to_string() }
    }

    pub fn create_table(&mut self, name: &str, id_type: IdType) {
        self.tables.insert(name.to_string(), MemoryTable { id_type, ..Default::default() });
    }

    /// Inserts one object row, assigning an id per the table's `IdType`.
    /// Inserting into an undeclared table creates it with `IdType::None`.
    pub fn insert(&mut self, table: &str, row: Value) -> Result<Value> {
        let id_key = self.id_key.clone();
        let entry = self
            .tables
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable { id_type: IdType::None, ..Default::default() });

        let mut obj = match row {
            Value::Object(map) => map,
            other => {
                return Err(QueryError::Backend(format!(
                    "can't insert non-object row into '{}': {}",
                    table, other
                )))
            }
        };

        match entry.id_type {
            IdType::Uuid => {
                obj.insert(id_key, Value::String(Uuid::new_v4().to_string()));
            }
            IdType::Int => {
                entry.next_id += 1;
                obj.insert(id_key, Value::Number(entry.next_id.into()));
            }
            IdType::None => {}
        }

        entry.rows.push(obj.clone());
        Ok(Value::Object(obj))
    }

    pub fn insert_batch(&mut self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>> {
        rows.into_iter().map(|row| self.insert(table, row)).collect()
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Scans one table into alias-prefixed rows (`alias.column` keys).
    fn scan(&self, node: &JoinNode) -> Result<Vec<Row>> {
        let table = self
            .tables
            .get(&node.table)
            .ok_or_else(|| QueryError::Backend(format!("unknown table '{}'", node.table)))?;

        let mut out = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let mut prefixed = Row::new();
            for (key, value) in row {
                prefixed.insert(format!("{}.{}", node.alias, key), value.clone());
            }
            out.push(prefixed);
        }
        Ok(out)
    }

    /// Walks the plan's join chain, nested-loop inner-joining each node onto
    /// the rows accumulated so far, then filters by the compiled predicate.
    fn join_and_filter(&self, plan: &QueryPlan) -> Result<Vec<Row>> {
        let mut nodes = plan.joins.values();
        let root = nodes
            .next()
            .ok_or_else(|| QueryError::Backend("plan has no join chain".to_string()))?;

        let mut rows = self.scan(root)?;
        for node in nodes {
            let child_rows = self.scan(node)?;
            let (parent_key, child_key) = self.join_keys(plan, node)?;

            let mut joined = Vec::new();
            for left in &rows {
                let left_value = left.get(&parent_key).unwrap_or(&Value::Null);
                for right in &child_rows {
                    let right_value = right.get(&child_key).unwrap_or(&Value::Null);
                    if Eval::value_equal(left_value, right_value) {
                        let mut merged = left.clone();
                        for (k, v) in right {
                            merged.insert(k.clone(), v.clone());
                        }
                        joined.push(merged);
                    }
                }
            }
            rows = joined;
        }

        if let Some(predicate) = &plan.predicate {
            rows.retain(|row| Eval::eval_predicate(predicate, row));
        }
        Ok(rows)
    }

    /// Foreign-key convention for one join edge:
    /// single-valued edges match `parent.<fk>` = `child.<id>` where the fk
    /// column is the relation field's override or `<field>_id`;
    /// multi-valued edges match `child.<singular(parent table)>_<id>` =
    /// `parent.<id>`.
    fn join_keys(&self, plan: &QueryPlan, node: &JoinNode) -> Result<(String, String)> {
        let parent_alias = node
            .parent
            .as_deref()
            .ok_or_else(|| QueryError::Backend(format!("join '{}' has no parent", node.alias)))?;
        let edge = node
            .via
            .as_ref()
            .ok_or_else(|| QueryError::Backend(format!("join '{}' has no edge", node.alias)))?;

        if edge.multi {
            let parent_table = &plan.joins[parent_alias].table;
            let reference = format!("{}_{}", Self::singular(parent_table), self.id_key);
            Ok((
                format!("{}.{}", parent_alias, self.id_key),
                format!("{}.{}", node.alias, reference),
            ))
        } else {
            let fk = edge
                .column
                .clone()
                .unwrap_or_else(|| format!("{}_id", edge.field));
            Ok((
                format!("{}.{}", parent_alias, fk),
                format!("{}.{}", node.alias, self.id_key),
            ))
        }
    }

    fn singular(table: &str) -> &str {
        table.strip_suffix('s').unwrap_or(table)
    }

    /// Depth-first walk of the join chain for `exists`: extends `acc` with
    /// one matching row per remaining node and stops as soon as a fully
    /// joined row passes the predicate. `keys[depth - 1]` holds the edge
    /// between node `depth - 1` and node `depth`.
    fn descend(
        scans: &[Vec<Row>],
        keys: &[(String, String)],
        depth: usize,
        acc: &Row,
        predicate: Option<&Predicate>,
    ) -> bool {
        if depth == scans.len() {
            return predicate.map_or(true, |p| Eval::eval_predicate(p, acc));
        }
        let (parent_key, child_key) = &keys[depth - 1];
        let left = acc.get(parent_key).unwrap_or(&Value::Null);
        scans[depth].iter().any(|right| {
            let right_value = right.get(child_key).unwrap_or(&Value::Null);
            if !Eval::value_equal(left, right_value) {
                return false;
            }
            let mut merged = acc.clone();
            for (k, v) in right {
                merged.insert(k.clone(), v.clone());
            }
            Self::descend(scans, keys, depth + 1, &merged, predicate)
        })
    }

    fn project(plan: &QueryPlan, root_alias: &str, row: &Row) -> Row {
        let mut out = Row::new();
        for field in &plan.fields {
            let key = format!("{}.{}", root_alias, field.column);
            out.insert(field.field.clone(), row.get(&key).cloned().unwrap_or(Value::Null));
        }
        out
    }
}

impl ExecutionBackend for MemoryBackend {
    fn fetch(&self, plan: &QueryPlan) -> Result<Vec<Row>> {
        let root_alias = plan
            .root()
            .map(|r| r.alias.clone())
            .ok_or_else(|| QueryError::Backend("plan has no join chain".to_string()))?;

        let mut rows = self.join_and_filter(plan)?;

        if let Some(page) = &plan.page {
            if let Some(sort) = &page.sort {
                let column = plan
                    .fields
                    .iter()
                    .find(|f| f.field == sort.field)
                    .map(|f| f.column.clone())
                    .unwrap_or_else(|| sort.field.clone());
                let key = format!("{}.{}", root_alias, column);
                rows.sort_by(|a, b| {
                    let av = a.get(&key).unwrap_or(&Value::Null);
                    let bv = b.get(&key).unwrap_or(&Value::Null);
                    Eval::cmp_for_sort(av, bv, sort.ascending)
                });
            }
            let start = page.offset().min(rows.len());
            let end = (start + page.limit()).min(rows.len());
            rows = rows[start..end].to_vec();
        }

        debug!(rows = rows.len(), root = %root_alias, "memory fetch");
        Ok(rows.iter().map(|row| Self::project(plan, &root_alias, row)).collect())
    }

    fn count(&self, plan: &QueryPlan) -> Result<u64> {
        Ok(self.join_and_filter(plan)?.len() as u64)
    }

    fn exists(&self, plan: &QueryPlan) -> Result<bool> {
        let nodes: Vec<&JoinNode> = plan.joins.values().collect();
        if nodes.is_empty() {
            return Err(QueryError::Backend("plan has no join chain".to_string()));
        }

        let scans = nodes
            .iter()
            .map(|node| self.scan(node))
            .collect::<Result<Vec<_>>>()?;
        let keys = nodes[1..]
            .iter()
            .map(|node| self.join_keys(plan, node))
            .collect::<Result<Vec<_>>>()?;

        let predicate = plan.predicate.as_ref();
        Ok(scans[0]
            .iter()
            .any(|row| Self::descend(&scans, &keys, 1, row, predicate)))
    }
}
