use common::types::ACTION_SOURCE_WEBSITE;
use serde::Deserialize;
use serde::Serialize;

use crate::is_blank;
use crate::track::CustomData;
use crate::RequestContext;
use crate::Track;

/// Request body of the conversions API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub data: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_event_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_name: String,
    pub event_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
    pub action_source: String,
    pub user_data: UserData,
    pub custom_data: CustomData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|v| !is_blank(v))
}

impl Payload {
    pub fn build(ctx: &RequestContext, track: Track) -> Self {
        let user_data = UserData {
            client_ip_address: ctx.client_ip.map(|ip| ip.to_string()),
            client_user_agent: non_empty(ctx.user_agent.clone()),
            fbp: non_empty(track.fbp),
            fbc: non_empty(track.fbc),
        };

        let event = Event {
            event_name: track.event,
            event_time: ctx.received_at.timestamp(),
            event_id: non_empty(track.event_id),
            event_source_url: non_empty(track.event_source_url),
            action_source: ACTION_SOURCE_WEBSITE.to_string(),
            user_data,
            custom_data: track.custom_data,
        };

        Payload {
            data: vec![event],
            test_event_code: non_empty(track.test_event_code),
        }
    }

    pub fn event_name(&self) -> &str {
        self.data.first().map(|e| e.event_name.as_str()).unwrap_or_default()
    }

    pub fn event_id(&self) -> Option<&str> {
        self.data.first().and_then(|e| e.event_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;
    use std::net::Ipv4Addr;

    use chrono::TimeZone;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn ctx() -> RequestContext {
        let mut ctx = RequestContext::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        ctx.client_ip = Some(IpAddr::V4(Ipv4Addr::new(101, 10, 8, 21)));
        ctx.user_agent = Some("Mozilla/5.0".to_string());
        ctx
    }

    #[test]
    fn test_full_payload() {
        let track = Track {
            event: "LinkClick".to_string(),
            event_id: Some("abc".to_string()),
            event_source_url: Some("https://example.com/meinherz".to_string()),
            fbp: Some("fb.1.1700000000000.123".to_string()),
            fbc: Some("fb.1.1714564800.xyz".to_string()),
            custom_data: CustomData {
                artist_name: Some("matas".to_string()),
                title: Some("Mein Herz".to_string()),
                music_service: Some("spotify".to_string()),
                value: Some(0),
                currency: Some("EUR".to_string()),
                ..Default::default()
            },
            test_event_code: Some("TEST123".to_string()),
        };

        let v = serde_json::to_value(Payload::build(&ctx(), track)).unwrap();
        assert_eq!(
            v,
            json!({
                "data": [{
                    "event_name": "LinkClick",
                    "event_time": 1714564800,
                    "event_id": "abc",
                    "event_source_url": "https://example.com/meinherz",
                    "action_source": "website",
                    "user_data": {
                        "client_ip_address": "101.10.8.21",
                        "client_user_agent": "Mozilla/5.0",
                        "fbp": "fb.1.1700000000000.123",
                        "fbc": "fb.1.1714564800.xyz"
                    },
                    "custom_data": {
                        "artist_name": "matas",
                        "title": "Mein Herz",
                        "music_service": "spotify",
                        "value": 0,
                        "currency": "EUR"
                    }
                }],
                "test_event_code": "TEST123"
            })
        );
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let mut ctx = ctx();
        ctx.client_ip = None;
        ctx.user_agent = Some("".to_string());
        let track = Track {
            event: "LinkVisit".to_string(),
            fbp: Some("".to_string()),
            fbc: None,
            test_event_code: Some("".to_string()),
            ..Default::default()
        };

        let v = serde_json::to_value(Payload::build(&ctx, track)).unwrap();
        assert_eq!(v["data"][0]["user_data"], json!({}));
        assert!(v["data"][0].get("event_id").is_none());
        assert!(v["data"][0].get("event_source_url").is_none());
        assert!(v.get("test_event_code").is_none());
    }

    #[test]
    fn test_extra_custom_data_is_flattened() {
        let mut track = Track {
            event: "LinkClick".to_string(),
            ..Default::default()
        };
        track
            .custom_data
            .extra
            .insert("destination_url".to_string(), json!("https://open.spotify.com"));

        let payload = Payload::build(&ctx(), track);
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            v["data"][0]["custom_data"],
            json!({"destination_url": "https://open.spotify.com"})
        );
        assert_eq!(payload.event_name(), "LinkClick");
        assert_eq!(payload.event_id(), None);
    }
}
