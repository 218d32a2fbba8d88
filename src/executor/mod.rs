use serde_json::{Map, Value};

use crate::{plan::QueryPlan, Result};

pub mod eval;
pub use eval::*;

pub mod memory;
pub use memory::*;

/// One flat result row: field or alias-qualified column -> value.
pub type Row = Map<String, Value>;

/// Runs a resolved query descriptor against a data store.
///
/// `fetch` returns rows already projected to the plan's select fields and
/// keyed by field name, honoring the plan's pagination when present.
/// `count` ignores pagination; `exists` is a bounded probe.
pub trait ExecutionBackend {
    fn fetch(&self, plan: &QueryPlan) -> Result<Vec<Row>>;
    fn count(&self, plan: &QueryPlan) -> Result<u64>;
    fn exists(&self, plan: &QueryPlan) -> Result<bool>;
}
