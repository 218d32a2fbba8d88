pub mod field;
pub use field::*;

pub mod entity_schema;
pub use entity_schema::*;

pub mod registry;
pub use registry::*;
