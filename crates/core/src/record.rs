//! The screening record.
//!
//! On disk a record is one flat JSON object:
//!
//! ```text
//! {"id":"…","ts":"2025-01-01T09:30:00.000000Z","Glucose":"130",…,"Prediction":"…"}
//! ```
//!
//! Every key other than `id`, `ts` and `Prediction` is a feature entry. Serialization writes
//! features in profile order between `ts` and `Prediction`; deserialization keeps whatever
//! feature keys the line carries, in file order, so records written under an older feature set
//! stay readable.

use crate::constants::{RECORD_ID_KEY, RECORD_PREDICTION_KEY, RECORD_TIMESTAMP_KEY};
use chrono::{SecondsFormat, Utc};
use screening_uuid::RecordId;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One persisted screening event. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    /// UTC creation time as written (RFC 3339).
    pub timestamp: String,
    /// Submitted values exactly as provided, keyed by feature name, in order.
    pub features: Vec<(String, String)>,
    pub prediction_label: String,
}

impl Record {
    /// Creates a record with a fresh id stamped with the current UTC time.
    pub fn new(features: Vec<(String, String)>, prediction_label: String) -> Self {
        Self {
            id: RecordId::new(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            features,
            prediction_label,
        }
    }

    /// Returns the submitted value for `name`, if the record carries it.
    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.features.len() + 3))?;
        map.serialize_entry(RECORD_ID_KEY, &self.id)?;
        map.serialize_entry(RECORD_TIMESTAMP_KEY, &self.timestamp)?;
        for (name, value) in &self.features {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(RECORD_PREDICTION_KEY, &self.prediction_label)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat screening record object")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Record, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut id: Option<RecordId> = None;
        let mut timestamp: Option<String> = None;
        let mut prediction_label: Option<String> = None;
        let mut features: Vec<(String, String)> = Vec::new();

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                RECORD_ID_KEY => {
                    if id.is_some() {
                        return Err(de::Error::duplicate_field(RECORD_ID_KEY));
                    }
                    id = Some(access.next_value()?);
                }
                RECORD_TIMESTAMP_KEY => {
                    if timestamp.is_some() {
                        return Err(de::Error::duplicate_field(RECORD_TIMESTAMP_KEY));
                    }
                    timestamp = Some(access.next_value()?);
                }
                RECORD_PREDICTION_KEY => {
                    if prediction_label.is_some() {
                        return Err(de::Error::duplicate_field(RECORD_PREDICTION_KEY));
                    }
                    prediction_label = Some(access.next_value()?);
                }
                _ => {
                    if features.iter().any(|(name, _)| *name == key) {
                        return Err(de::Error::custom(format!("duplicate feature `{key}`")));
                    }
                    let value: FeatureScalar = access.next_value()?;
                    features.push((key, value.0));
                }
            }
        }

        Ok(Record {
            id: id.ok_or_else(|| de::Error::missing_field(RECORD_ID_KEY))?,
            timestamp: timestamp.ok_or_else(|| de::Error::missing_field(RECORD_TIMESTAMP_KEY))?,
            features,
            prediction_label: prediction_label
                .ok_or_else(|| de::Error::missing_field(RECORD_PREDICTION_KEY))?,
        })
    }
}

/// A feature value read back from a log line. Strings are kept verbatim; other scalars are
/// kept as their JSON text and `null` becomes the empty string.
struct FeatureScalar(String);

impl<'de> Deserialize<'de> for FeatureScalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Self(s)),
            serde_json::Value::Null => Ok(Self(String::new())),
            value @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_)) => {
                Ok(Self(value.to_string()))
            }
            _ => Err(de::Error::custom("feature values must be scalars")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            id: RecordId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            timestamp: "2025-03-01T10:15:00.123456Z".into(),
            features: vec![
                ("Glucose".into(), "130".into()),
                ("BMI".into(), "28.5".into()),
                ("Age".into(), "".into()),
            ],
            prediction_label: "🟢 Low Risk – keep up the healthy lifestyle!".into(),
        }
    }

    #[test]
    fn serializes_to_flat_object_in_order() {
        let line = serde_json::to_string(&sample()).unwrap();

        assert_eq!(
            line,
            concat!(
                r#"{"id":"550e8400-e29b-41d4-a716-446655440000","ts":"2025-03-01T10:15:00.123456Z","#,
                r#""Glucose":"130","BMI":"28.5","Age":"","Prediction":"🟢 Low Risk – keep up the healthy lifestyle!"}"#
            )
        );
    }

    #[test]
    fn parses_back_field_for_field() {
        let record = sample();
        let line = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed, record);
    }

    #[test]
    fn tolerates_key_order_and_scalar_values() {
        let line = r#"{"Prediction":"x","Glucose":130,"flag":true,"note":null,"id":"550e8400-e29b-41d4-a716-446655440000","ts":"t"}"#;
        let parsed: Record = serde_json::from_str(line).unwrap();

        assert_eq!(parsed.feature("Glucose"), Some("130"));
        assert_eq!(parsed.feature("flag"), Some("true"));
        assert_eq!(parsed.feature("note"), Some(""));
        assert_eq!(parsed.prediction_label, "x");
    }

    #[test]
    fn rejects_missing_reserved_fields() {
        let no_id = r#"{"ts":"t","Prediction":"x"}"#;
        let no_prediction = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","ts":"t"}"#;

        assert!(serde_json::from_str::<Record>(no_id).is_err());
        assert!(serde_json::from_str::<Record>(no_prediction).is_err());
    }

    #[test]
    fn rejects_nested_feature_values_and_bad_ids() {
        let nested = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","ts":"t","a":{"b":1},"Prediction":"x"}"#;
        let bad_id = r#"{"id":"abc","ts":"t","Prediction":"x"}"#;

        assert!(serde_json::from_str::<Record>(nested).is_err());
        assert!(serde_json::from_str::<Record>(bad_id).is_err());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let dup = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","ts":"t","a":"1","a":"2","Prediction":"x"}"#;
        assert!(serde_json::from_str::<Record>(dup).is_err());
    }

    #[test]
    fn new_record_has_rfc3339_utc_timestamp() {
        let record = Record::new(vec![], "label".into());

        assert!(record.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }
}
