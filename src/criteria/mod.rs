pub mod table_join;
pub use table_join::*;

pub mod join_graph;
pub use join_graph::*;

pub mod clause;
pub use clause::*;

pub mod compile;
pub use compile::*;

pub mod search_criteria;
pub use search_criteria::*;
