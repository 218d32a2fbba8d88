use std::{any::TypeId, collections::HashMap};

use crate::{schema::EntitySchema, QueryError, Result};

/// A type that maps to a relational table.
///
/// `schema()` is the static declaration the engine resolves names against;
/// implement it once per entity and register the type in a `SchemaRegistry`
/// at startup.
pub trait Entity: 'static {
    /// Entity name used in diagnostics and join resolution.
    const NAME: &'static str;

    fn schema() -> EntitySchema;
}

/// Identity handle for a registered entity type. Cheap to copy; relation
/// fields hold these instead of the full schema so mutually-referencing
/// entities can describe each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    type_id: TypeId,
    pub name: &'static str,
}

impl EntityId {
    pub fn of<E: Entity>() -> Self {
        Self { type_id: TypeId::of::<E>(), name: E::NAME }
    }
}

/// All entity schemas known to the process, built once at startup and passed
/// by reference into each query. Plain read-only data after construction.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<TypeId, EntitySchema>,
    tables: HashMap<String, EntityId>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable registration: `SchemaRegistry::new().register::<Customer>()`.
    pub fn register<E: Entity>(mut self) -> Self {
        let id = EntityId::of::<E>();
        let schema = E::schema();
        self.tables.insert(schema.table.clone(), id);
        self.schemas.insert(id.type_id, schema);
        self
    }

    pub fn schema_of(&self, id: EntityId) -> Result<&EntitySchema> {
        self.schemas
            .get(&id.type_id)
            .ok_or_else(|| QueryError::Schema(format!("entity {} has no table mapping; was it registered?", id.name)))
    }

    pub fn schema_of_type<E: Entity>(&self) -> Result<&EntitySchema> {
        self.schema_of(EntityId::of::<E>())
    }

    pub fn entity_by_table(&self, table: &str) -> Option<EntityId> {
        self.tables.get(table).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, ScalarKind};

    struct Product;

    impl Entity for Product {
        const NAME: &'static str = "Product";
        fn schema() -> EntitySchema {
            EntitySchema::new("Product", "products")
                .field("id", FieldDef::scalar(ScalarKind::Int))
                .field("name", FieldDef::scalar(ScalarKind::Str))
        }
    }

    struct Unregistered;

    impl Entity for Unregistered {
        const NAME: &'static str = "Unregistered";
        fn schema() -> EntitySchema {
            EntitySchema::new("Unregistered", "nowhere")
        }
    }

    #[test]
    fn registered_types_resolve_by_id_and_table() {
        let registry = SchemaRegistry::new().register::<Product>();

        let schema = registry.schema_of(EntityId::of::<Product>()).unwrap();
        assert_eq!(schema.table, "products");

        let id = registry.entity_by_table("products").unwrap();
        assert_eq!(id, EntityId::of::<Product>());
        assert!(registry.entity_by_table("orders").is_none());
    }

    #[test]
    fn unregistered_type_is_a_schema_error() {
        let registry = SchemaRegistry::new().register::<Product>();
        let err = registry.schema_of_type::<Unregistered>().unwrap_err();
        assert!(matches!(err, QueryError::Schema(_)));
    }
}
