use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{QueryError, Result};

/// Materializes a flat field -> value map into a typed result object.
pub fn materialize<T: DeserializeOwned>(row: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(row)).map_err(|err| QueryError::Mapping(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct CustomerRow {
        id: i64,
        name: String,
        active: Option<bool>,
    }

    fn row(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn materializes_a_full_row() {
        let c: CustomerRow = materialize(row(json!({"id": 1, "name": "Ana", "active": true}))).unwrap();
        assert_eq!(c, CustomerRow { id: 1, name: "Ana".into(), active: Some(true) });
    }

    #[test]
    fn missing_optional_fields_stay_none() {
        let c: CustomerRow = materialize(row(json!({"id": 2, "name": "Bob"}))).unwrap();
        assert_eq!(c.active, None);
    }

    #[test]
    fn type_mismatch_surfaces_as_mapping_error() {
        let out: Result<CustomerRow> = materialize(row(json!({"id": "nope", "name": "Cara"})));
        assert!(matches!(out, Err(QueryError::Mapping(_))));
    }
}
