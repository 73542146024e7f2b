//! Wire types of the invocation protocol.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// The single remote procedure the gateway calls.
pub const INVOKE_METHOD: &str = "Function.Invoke";

/// Horizon added to "now" when stamping the envelope deadline.
const DEADLINE_HORIZON: Duration = Duration::from_secs(60 * 60);

/// Absolute deadline, split into seconds and sub-second nanos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub seconds: i64,
    pub nanos: i64,
}

impl Deadline {
    /// Deadline at `now + DEADLINE_HORIZON`, computed at call time.
    pub fn from_now() -> Self {
        let deadline = SystemTime::now() + DEADLINE_HORIZON;
        let since_epoch = deadline
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self {
            seconds: since_epoch.as_secs() as i64,
            nanos: i64::from(since_epoch.subsec_nanos()),
        }
    }
}

/// Envelope carried by one "Function.Invoke" call.
///
/// Identity/context fields are kept at zero values for protocol shape;
/// a development gateway has nothing real to put there.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeEnvelope {
    pub payload: String,
    pub request_id: String,
    pub x_amzn_trace_id: String,
    pub deadline: Deadline,
    pub invoked_function_arn: String,
    pub cognito_identity_id: String,
    pub cognito_identity_pool_id: String,
    pub client_context: Option<serde_json::Value>,
}

impl InvokeEnvelope {
    pub fn new(payload: String) -> Self {
        Self {
            payload,
            request_id: "0".to_owned(),
            x_amzn_trace_id: String::new(),
            deadline: Deadline::from_now(),
            invoked_function_arn: String::new(),
            cognito_identity_id: String::new(),
            cognito_identity_pool_id: String::new(),
            client_context: None,
        }
    }
}

/// One call-by-name request frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRequest {
    pub service_method: String,
    pub seq: u64,
    pub body: InvokeEnvelope,
}

impl RpcRequest {
    pub fn invoke(envelope: InvokeEnvelope) -> Self {
        Self {
            service_method: INVOKE_METHOD.to_owned(),
            seq: 0,
            body: envelope,
        }
    }
}

/// Host-reported error record inside a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeErrorRecord {
    pub message: String,
}

/// One reply frame: either an error record or a success payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<InvokeErrorRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl InvokeReply {
    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            error: None,
            payload: Some(payload.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(InvokeErrorRecord {
                message: message.into(),
            }),
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn deadline_sits_one_hour_out() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let deadline = Deadline::from_now();
        let delta = deadline.seconds - now;
        assert!((3599..=3601).contains(&delta), "delta was {delta}");
        assert!(deadline.nanos < 1_000_000_000);
    }

    #[test]
    fn envelope_carries_placeholders() {
        let envelope = InvokeEnvelope::new("{}".to_owned());
        assert_eq!(envelope.request_id, "0");
        assert_eq!(envelope.x_amzn_trace_id, "");
        assert_eq!(envelope.invoked_function_arn, "");
        assert!(envelope.client_context.is_none());
    }

    #[test]
    fn request_frame_field_names() {
        let request = RpcRequest::invoke(InvokeEnvelope::new("{\"a\":1}".to_owned()));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["serviceMethod"], INVOKE_METHOD);
        assert_eq!(value["seq"], 0);
        let body = value["body"].as_object().unwrap();
        for key in [
            "payload",
            "requestId",
            "xAmznTraceId",
            "deadline",
            "invokedFunctionArn",
            "cognitoIdentityId",
            "cognitoIdentityPoolId",
            "clientContext",
        ] {
            assert!(body.contains_key(key), "missing {key}");
        }
        assert!(body["deadline"].get("seconds").is_some());
        assert!(body["deadline"].get("nanos").is_some());
    }

    #[test]
    fn reply_round_trips() {
        let reply: InvokeReply =
            serde_json::from_str(r#"{"error":{"message":"boom"}}"#).unwrap();
        assert_eq!(reply.error.unwrap().message, "boom");
        assert!(reply.payload.is_none());

        let reply: InvokeReply = serde_json::from_str(r#"{"payload":"{}"}"#).unwrap();
        assert!(reply.error.is_none());
        assert_eq!(reply.payload.unwrap(), "{}");
    }
}
