//! Format "1.0" (REST-API style) request events.

use std::collections::HashMap;
use std::net::IpAddr;

use axum::http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;

use super::{decoded_path, encode_body, host_of, query_pairs, TRACE_ID_PLACEHOLDER};

/// A format-"1.0" proxy-integration request event.
///
/// Field names and nesting follow the established proxy-integration
/// contract; function hosts deserialize against these names verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequestEvent {
    pub resource: String,
    pub path: String,
    pub http_method: String,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub query_string_parameters: HashMap<String, String>,
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_parameters: Option<HashMap<String, String>>,
    pub request_context: RequestContext,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Opaque request-context record; a development gateway sends it empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {}

/// Translate an HTTP request into a format-"1.0" event.
///
/// Cannot fail: every well-formed request maps to exactly one event.
/// Header values that are not valid UTF-8 are skipped.
pub fn build_event(
    config: &GatewayConfig,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    remote_ip: IpAddr,
    body: &[u8],
) -> ProxyRequestEvent {
    let path = decoded_path(uri);

    let mut single = HashMap::new();
    let mut multi: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        single.insert(name.as_str().to_owned(), value.to_owned());
        multi
            .entry(name.as_str().to_owned())
            .or_default()
            .push(value.to_owned());
    }

    // Seed the host entry so it is present even when the header is missing.
    let host = host_of(headers, uri);
    single.entry("host".to_owned()).or_insert_with(|| host.clone());
    multi.entry("host".to_owned()).or_insert_with(|| vec![host]);

    // Synthetic headers win over same-named client headers. They replace
    // the whole multi-valued entry so the single/multi invariant holds.
    let synthetic = [
        ("x-amzn-trace-id", TRACE_ID_PLACEHOLDER.to_owned()),
        ("x-forwarded-for", remote_ip.to_string()),
        ("x-forwarded-port", config.port.to_string()),
        ("x-forwarded-proto", config.scheme().to_owned()),
    ];
    for (name, value) in synthetic {
        single.insert(name.to_owned(), value.clone());
        multi.insert(name.to_owned(), vec![value]);
    }

    let mut query = HashMap::new();
    let mut multi_query: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in query_pairs(uri) {
        query.insert(key.clone(), value.clone());
        multi_query.entry(key).or_default().push(value);
    }

    let (resource, path_parameters) = if path == "/" {
        ("/".to_owned(), None)
    } else {
        let proxy = path.strip_prefix('/').unwrap_or(&path).to_owned();
        (
            "/{proxy+}".to_owned(),
            Some(HashMap::from([("proxy".to_owned(), proxy)])),
        )
    };

    let (body, is_base64_encoded) = encode_body(body);

    ProxyRequestEvent {
        resource,
        path,
        http_method: method.as_str().to_owned(),
        headers: single,
        multi_value_headers: multi,
        query_string_parameters: query,
        multi_value_query_string_parameters: multi_query,
        path_parameters,
        request_context: RequestContext::default(),
        body,
        is_base64_encoded,
    }
}
