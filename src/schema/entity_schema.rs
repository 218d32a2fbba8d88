use indexmap::IndexMap;

use crate::{plan::SelectField, schema::{EntityId, FieldDef, FieldKind}};

/// Static description of one entity: its table name and declared fields in
/// declaration order. Built once per type by the `Entity` impl and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub table: String,
    /// Map of field name -> field metadata, in declaration order.
    pub fields: IndexMap<String, FieldDef>,
}

impl EntitySchema {
    pub fn new(entity: &'static str, table: &str) -> Self {
        Self { entity, table: table.to_string(), fields: IndexMap::new() }
    }

    /// Chainable field declaration.
    pub fn field(mut self, name: &str, def: FieldDef) -> Self {
        self.fields.insert(name.to_string(), def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Resolves a caller-written column token to the canonical field name.
    /// An exact field-name match wins; otherwise a field whose physical
    /// column override equals the token matches.
    pub fn resolve_column(&self, raw: &str) -> Option<&str> {
        if let Some((name, _)) = self.fields.get_key_value(raw) {
            return Some(name.as_str());
        }
        self.fields
            .iter()
            .find(|(_, def)| def.column == Some(raw))
            .map(|(name, _)| name.as_str())
    }

    /// Physical column for a field: the declared override, else the field
    /// name itself.
    pub fn column_of<'a>(&'a self, field: &'a str) -> &'a str {
        self.fields
            .get(field)
            .and_then(|def| def.column)
            .unwrap_or(field)
    }

    /// First declared relation field whose target is `target`. Used to infer
    /// the connecting field when a join point declares no explicit one.
    pub fn join_field_to(&self, target: EntityId) -> Option<(&str, &FieldDef)> {
        self.fields
            .iter()
            .find(|(_, def)| def.relation_target() == Some(target))
            .map(|(name, def)| (name.as_str(), def))
    }

    /// Relation field matching a string key: by field name, by physical
    /// column override, or by join-table name, in that order.
    pub fn relation_named(&self, key: &str) -> Option<(&str, &FieldDef)> {
        self.fields
            .iter()
            .filter(|(_, def)| def.is_relation())
            .find(|(name, def)| {
                if name.as_str() == key {
                    return true;
                }
                if def.column == Some(key) {
                    return true;
                }
                matches!(def.kind, FieldKind::Relation { join_table: Some(jt), .. } if jt == key)
            })
            .map(|(name, def)| (name.as_str(), def))
    }

    /// Scalar fields in declaration order, paired with their physical
    /// columns. Relation fields are excluded: they are not materializable
    /// from a flat row.
    pub fn select_fields(&self) -> Vec<SelectField> {
        self.fields
            .iter()
            .filter(|(_, def)| !def.is_relation())
            .map(|(name, def)| SelectField {
                field: name.clone(),
                column: def.column.unwrap_or(name.as_str()).to_string(),
            })
            .collect()
    }
}
