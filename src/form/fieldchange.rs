//! Field-change events.
//!
//! The UI emits loosely-typed `{ field, value }` events; they convert
//! into the closed [`FieldChange`] union before the controller sees
//! them. Conversion failure means the event is ignored, never a crash.

use super::draft::QueryType;
use crate::base::FormError;
use serde::Deserialize;

/// A raw change event as delivered by the UI event source.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFieldChange {
    pub field: String,
    pub value: RawFieldValue,
}

/// A raw event value: a single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFieldValue {
    Text(String),
    List(Vec<String>),
}

/// A validated change to exactly one draft attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Locations(Vec<String>),
    Type(QueryType),
    Vrf(String),
    Target(String),
}

impl TryFrom<RawFieldChange> for FieldChange {
    type Error = FormError;

    fn try_from(raw: RawFieldChange) -> Result<Self, Self::Error> {
        match (raw.field.as_str(), raw.value) {
            ("query_location", RawFieldValue::List(locations)) => {
                Ok(FieldChange::Locations(locations))
            }
            ("query_type", RawFieldValue::Text(value)) => value
                .parse::<QueryType>()
                .map(FieldChange::Type)
                .map_err(|()| FormError::UnknownQueryType { value }),
            ("query_vrf", RawFieldValue::Text(vrf)) => Ok(FieldChange::Vrf(vrf)),
            ("query_target", RawFieldValue::Text(target)) => Ok(FieldChange::Target(target)),
            ("query_location" | "query_type" | "query_vrf" | "query_target", _) => {
                Err(FormError::FieldValueShape { field: raw.field })
            }
            _ => Err(FormError::UnknownField { field: raw.field }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(field: &str, value: &str) -> RawFieldChange {
        RawFieldChange {
            field: field.into(),
            value: RawFieldValue::Text(value.into()),
        }
    }

    #[test]
    fn test_valid_conversions() {
        let change = FieldChange::try_from(RawFieldChange {
            field: "query_location".into(),
            value: RawFieldValue::List(vec!["router01".into(), "router02".into()]),
        })
        .unwrap();
        assert_eq!(
            change,
            FieldChange::Locations(vec!["router01".into(), "router02".into()])
        );

        assert_eq!(
            FieldChange::try_from(text("query_type", "traceroute")).unwrap(),
            FieldChange::Type(QueryType::Traceroute)
        );
        assert_eq!(
            FieldChange::try_from(text("query_vrf", "blue")).unwrap(),
            FieldChange::Vrf("blue".into())
        );
        assert_eq!(
            FieldChange::try_from(text("query_target", "example.com")).unwrap(),
            FieldChange::Target("example.com".into())
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = FieldChange::try_from(text("query_color", "red")).unwrap_err();
        assert!(matches!(err, FormError::UnknownField { field } if field == "query_color"));
    }

    #[test]
    fn test_wrong_value_shape_rejected() {
        // A list where a string belongs
        let err = FieldChange::try_from(RawFieldChange {
            field: "query_target".into(),
            value: RawFieldValue::List(vec!["192.0.2.1".into()]),
        })
        .unwrap_err();
        assert!(matches!(err, FormError::FieldValueShape { field } if field == "query_target"));

        // A string where a list belongs
        let err = FieldChange::try_from(text("query_location", "router01")).unwrap_err();
        assert!(matches!(err, FormError::FieldValueShape { .. }));
    }

    #[test]
    fn test_unknown_query_type_rejected() {
        let err = FieldChange::try_from(text("query_type", "bgp_flowspec")).unwrap_err();
        assert!(matches!(err, FormError::UnknownQueryType { value } if value == "bgp_flowspec"));
    }

    #[test]
    fn test_raw_event_deserializes() {
        let raw: RawFieldChange =
            serde_json::from_str(r#"{"field": "query_location", "value": ["edge1"]}"#).unwrap();
        assert!(matches!(raw.value, RawFieldValue::List(ref v) if v == &["edge1".to_owned()]));

        let raw: RawFieldChange =
            serde_json::from_str(r#"{"field": "query_target", "value": "1.1.1.1"}"#).unwrap();
        assert!(matches!(raw.value, RawFieldValue::Text(ref v) if v == "1.1.1.1"));
    }
}
