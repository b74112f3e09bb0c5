/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Data types shared by the operation inputs and outputs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use weft_types::{Blob, DateTime};

/// A single document database value.
///
/// Externally tagged so the serialized form matches the wire shape exactly:
/// `{"S": "text"}`, `{"N": "1.5"}`, `{"M": {...}}`, and so on. Numbers travel
/// as strings to avoid precision loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Binary data.
    B(Blob),
    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Set of binary values.
    BS(Vec<Blob>),
    /// List of values.
    L(Vec<AttributeValue>),
    /// Map of string keys to values.
    M(HashMap<String, AttributeValue>),
    /// Number, transmitted as a string.
    N(String),
    /// Set of numbers, each transmitted as a string.
    NS(Vec<String>),
    /// Null.
    #[serde(rename = "NULL")]
    Null(bool),
    /// String.
    S(String),
    /// Set of strings.
    SS(Vec<String>),
}

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_m(&self) -> Option<&HashMap<String, AttributeValue>> {
        match self {
            AttributeValue::M(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null(true))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Creating,
    Updating,
    Deleting,
    Active,
    /// A status this client version does not know about.
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    Hash,
    Range,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScalarAttributeType {
    B,
    N,
    S,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    pub attribute_name: String,
    pub key_type: KeyType,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: ScalarAttributeType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughputDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_capacity_units: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_capacity_units: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_decreases_today: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_increase_date_time: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_decrease_date_time: Option<DateTime>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_status: Option<TableStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_definitions: Option<Vec<AttributeDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_schema: Option<Vec<KeySchemaElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughputDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date_time: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_size_bytes: Option<i64>,
}

#[cfg(test)]
mod test {
    use super::{AttributeValue, TableDescription, TableStatus};
    use std::collections::HashMap;
    use weft_types::Blob;

    #[test]
    fn attribute_values_are_externally_tagged() {
        assert_eq!(
            serde_json::to_string(&AttributeValue::S("movie".to_string())).unwrap(),
            r#"{"S":"movie"}"#
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::N("6.2".to_string())).unwrap(),
            r#"{"N":"6.2"}"#
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::Null(true)).unwrap(),
            r#"{"NULL":true}"#
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::Bool(false)).unwrap(),
            r#"{"BOOL":false}"#
        );
    }

    #[test]
    fn binary_values_travel_as_base64() {
        assert_eq!(
            serde_json::to_string(&AttributeValue::B(Blob::new("hello"))).unwrap(),
            r#"{"B":"aGVsbG8="}"#
        );
        let parsed: AttributeValue = serde_json::from_str(r#"{"B":"aGVsbG8="}"#).unwrap();
        assert_eq!(parsed, AttributeValue::B(Blob::new("hello")));
    }

    #[test]
    fn nested_maps_round_trip() {
        let mut inner = HashMap::new();
        inner.insert("rating".to_string(), AttributeValue::N("11".to_string()));
        let value = AttributeValue::M(inner);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"M":{"rating":{"N":"11"}}}"#);
        let parsed: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn unknown_table_status_does_not_fail_parsing() {
        let desc: TableDescription =
            serde_json::from_str(r#"{"TableName":"Movies","TableStatus":"ARCHIVING"}"#).unwrap();
        assert_eq!(desc.table_status, Some(TableStatus::Unknown));
    }

    #[test]
    fn table_description_parses_wire_shape() {
        let body = r#"{
            "TableName": "Movies",
            "TableStatus": "ACTIVE",
            "KeySchema": [{"AttributeName": "year", "KeyType": "HASH"}],
            "AttributeDefinitions": [{"AttributeName": "year", "AttributeType": "N"}],
            "ProvisionedThroughput": {"ReadCapacityUnits": 5, "WriteCapacityUnits": 5},
            "ItemCount": 42,
            "CreationDateTime": 1614952162.5
        }"#;
        let desc: TableDescription = serde_json::from_str(body).unwrap();
        assert_eq!(desc.table_name.as_deref(), Some("Movies"));
        assert_eq!(desc.table_status, Some(TableStatus::Active));
        assert_eq!(desc.key_schema.as_ref().unwrap().len(), 1);
        assert_eq!(desc.item_count, Some(42));
        let created = desc.creation_date_time.unwrap();
        assert_eq!(created.secs(), 1614952162);
        assert_eq!(created.subsec_nanos(), 500_000_000);
    }
}
