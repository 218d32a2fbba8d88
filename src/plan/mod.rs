pub mod query_plan;
pub use query_plan::*;

pub mod predicate;
pub use predicate::*;

pub mod page;
pub use page::*;
