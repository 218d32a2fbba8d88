pub mod error;
pub use error::{QueryError, Result};

pub mod scalar;
pub use scalar::Scalar;

pub mod schema;
pub use schema::{Entity, EntityId, EntitySchema, FieldDef, FieldKind, ScalarKind, SchemaRegistry};

pub mod plan;
pub use plan::{Page, PageRequest, QueryPlan, SortKey};

pub mod criteria;
pub use criteria::{Combinator, Equality, Membership, Numeric, SearchCriteria, TextMatch};

pub mod executor;
pub use executor::{ExecutionBackend, IdType, MemoryBackend, Row};

pub mod mapper;
