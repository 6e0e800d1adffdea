//! JSON document codec for campaign records.

use mapcampaigner_core::error::DomainError;
use serde_json::Value;

use super::record::{Attributes, CampaignRecord};

/// Writes a record as a JSON document. Dates holding a calendar date come
/// out as `YYYY-MM-DD`; unparseable date text is written unchanged; a blank
/// `end_date` is left out.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if serialization fails.
pub fn serialize(record: &CampaignRecord) -> Result<String, DomainError> {
    serde_json::to_string(record)
        .map_err(|e| DomainError::Infrastructure(format!("campaign serialization failed: {e}")))
}

/// Parses document text into an attribute mapping.
///
/// # Errors
///
/// Returns `DomainError::CorruptedFile` if `text` is not a JSON object.
pub fn deserialize(id: &str, text: &str) -> Result<Attributes, DomainError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(attributes)) => Ok(attributes),
        Ok(other) => Err(corrupted(
            id,
            format!("expected a JSON object, found {}", json_type(&other)),
        )),
        Err(e) => Err(corrupted(id, e.to_string())),
    }
}

/// Converts a validated mapping into a record. Unknown keys are ignored and
/// absent optional attributes take empty defaults.
///
/// # Errors
///
/// Returns `DomainError::CorruptedFile` if a known attribute has the wrong
/// JSON type.
pub fn decode_record(id: &str, attributes: Attributes) -> Result<CampaignRecord, DomainError> {
    serde_json::from_value(Value::Object(attributes)).map_err(|e| corrupted(id, e.to_string()))
}

/// The record as an attribute mapping, exactly as `serialize` would write it.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if serialization fails.
pub fn to_attributes(record: &CampaignRecord) -> Result<Attributes, DomainError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(attributes)) => Ok(attributes),
        Ok(_) => Err(DomainError::Infrastructure(
            "campaign did not serialize to an object".into(),
        )),
        Err(e) => Err(DomainError::Infrastructure(format!(
            "campaign serialization failed: {e}"
        ))),
    }
}

fn corrupted(id: &str, reason: String) -> DomainError {
    DomainError::CorruptedFile {
        id: id.to_owned(),
        reason,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use mapcampaigner_test_support::square_geometry;
    use serde_json::json;

    use super::*;
    use crate::domain::geometry::Geometry;
    use crate::domain::record::{CampaignDate, SelectedFunction};

    fn full_record() -> CampaignRecord {
        let mut selected_functions = BTreeMap::new();
        selected_functions.insert(
            "count-buildings".to_owned(),
            SelectedFunction {
                function: "FeatureAttributeCompleteness".to_owned(),
                feature: "building=yes".to_owned(),
                attributes: json!({"building": ["yes"]}),
                extra: Attributes::new(),
            },
        );
        CampaignRecord {
            uuid: "c1".to_owned(),
            version: 4,
            name: "Survey A".to_owned(),
            campaign_creator: "alice".to_owned(),
            edited_by: "bob".to_owned(),
            campaign_status: "active".to_owned(),
            coverage: json!({"last_uploaded": "2017-05-12"})
                .as_object()
                .unwrap()
                .clone(),
            geometry: Some(Geometry::new(square_geometry(0.0, 0.0, 1.0))),
            start_date: NaiveDate::from_ymd_opt(2017, 5, 10).map(CampaignDate::from),
            end_date: Some(CampaignDate::Text("when funding ends".to_owned())),
            campaign_managers: vec!["alice".to_owned(), "carol".to_owned()],
            selected_functions,
            tags: vec!["buildings".to_owned()],
            description: "Map every building".to_owned(),
        }
    }

    #[test]
    fn test_serialize_then_deserialize_reproduces_record() {
        // Arrange
        let record = full_record();

        // Act
        let text = serialize(&record).unwrap();
        let attributes = deserialize("c1", &text).unwrap();
        let decoded = decode_record("c1", attributes.clone()).unwrap();

        // Assert
        assert_eq!(decoded, record);
        assert_eq!(attributes["start_date"], json!("2017-05-10"));
        assert_eq!(attributes["end_date"], json!("when funding ends"));
    }

    #[test]
    fn test_serialize_writes_documented_key_order() {
        let mut record = full_record();
        record.end_date = None;

        let text = serialize(&record).unwrap();

        let keys = [
            "\"uuid\"",
            "\"version\"",
            "\"name\"",
            "\"campaign_creator\"",
            "\"edited_by\"",
            "\"campaign_status\"",
            "\"coverage\"",
            "\"geometry\"",
            "\"start_date\"",
            "\"campaign_managers\"",
            "\"selected_functions\"",
            "\"tags\"",
            "\"description\"",
        ];
        let offsets: Vec<usize> = keys.iter().map(|key| text.find(key).unwrap()).collect();
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(!text.contains("\"end_date\""));
    }

    #[test]
    fn test_deserialize_rejects_invalid_json() {
        match deserialize("c1", "{\"uuid\": ") {
            Err(DomainError::CorruptedFile { id, .. }) => assert_eq!(id, "c1"),
            other => panic!("expected CorruptedFile, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_rejects_non_object_documents() {
        match deserialize("c1", "[1, 2]") {
            Err(DomainError::CorruptedFile { reason, .. }) => assert!(reason.contains("an array")),
            other => panic!("expected CorruptedFile, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_record_ignores_unknown_keys() {
        let mut attributes = to_attributes(&full_record()).unwrap();
        attributes.insert("legacy_field".to_owned(), json!(true));

        let decoded = decode_record("c1", attributes).unwrap();

        assert_eq!(decoded, full_record());
    }

    #[test]
    fn test_decode_record_rejects_wrongly_typed_attribute() {
        let mut attributes = to_attributes(&full_record()).unwrap();
        attributes.insert("tags".to_owned(), json!("buildings"));

        assert!(matches!(
            decode_record("c1", attributes),
            Err(DomainError::CorruptedFile { .. })
        ));
    }
}
