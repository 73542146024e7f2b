//! Proxy-response events and format-"2.0" shape resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The response object a function host hands back.
///
/// Decoding is tolerant: absent fields take defaults, unknown fields are
/// ignored, so a handler may return a partial object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyResponseEvent {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl Default for ProxyResponseEvent {
    fn default() -> Self {
        Self {
            status_code: 200,
            headers: HashMap::new(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }
}

/// Resolve a format-"2.0" reply payload.
///
/// A handler may return either a full response object or a bare JSON
/// mapping meant to be wrapped. The discriminator is the presence of a
/// `statusCode` key; without it the payload itself becomes a 200
/// `application/json` body. Non-mapping payloads are malformed.
pub fn resolve_v2(payload: &str) -> Result<ProxyResponseEvent, serde_json::Error> {
    let map: Map<String, Value> = serde_json::from_str(payload)?;
    if map.contains_key("statusCode") {
        serde_json::from_value(Value::Object(map))
    } else {
        Ok(ProxyResponseEvent {
            status_code: 200,
            headers: HashMap::from([(
                "Content-Type".to_owned(),
                "application/json".to_owned(),
            )]),
            body: payload.to_owned(),
            is_base64_encoded: false,
        })
    }
}
