use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A tracking event on its way to the destinations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub event: String,
    pub event_id: Option<String>,
    pub event_source_url: Option<String>,
    pub fbp: Option<String>,
    pub fbc: Option<String>,
    pub custom_data: CustomData,
    pub test_event_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
