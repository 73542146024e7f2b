//! Format "2.0" (HTTP-API style) request events.

use std::collections::HashMap;
use std::net::IpAddr;

use axum::http::{header, HeaderMap, Method, Uri, Version};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;

use super::{decoded_path, encode_body, host_of, query_pairs, TRACE_ID_PLACEHOLDER};

/// A format-"2.0" proxy-integration request event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequestEventV2 {
    pub version: String,
    pub route_key: String,
    pub raw_path: String,
    pub raw_query_string: String,
    pub cookies: Vec<String>,
    pub headers: HashMap<String, String>,
    pub query_string_parameters: HashMap<String, String>,
    pub path_parameters: HashMap<String, String>,
    pub request_context: RequestContextV2,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Synthesized request context; development placeholders where the cloud
/// routing layer would carry real identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContextV2 {
    pub route_key: String,
    pub account_id: String,
    pub stage: String,
    pub request_id: String,
    pub api_id: String,
    pub domain_name: String,
    pub domain_prefix: String,
    pub time: String,
    pub time_epoch: i64,
    pub http: HttpDescriptor,
}

/// Nested HTTP descriptor of the request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpDescriptor {
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub source_ip: String,
    pub user_agent: String,
}

/// Translate an HTTP request into a format-"2.0" event.
///
/// `now` is captured once at the start of request handling and reused for
/// the access log, so event timestamps and the log line agree.
#[allow(clippy::too_many_arguments)]
pub fn build_event(
    config: &GatewayConfig,
    method: &Method,
    uri: &Uri,
    version: Version,
    headers: &HeaderMap,
    remote_ip: IpAddr,
    now: DateTime<Local>,
    body: &[u8],
) -> ProxyRequestEventV2 {
    let path = decoded_path(uri);
    let host = host_of(headers, uri);
    let domain_name = host
        .split_once(':')
        .map(|(name, _)| name.to_owned())
        .unwrap_or_else(|| host.clone());

    let mut cookies = Vec::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for entry in value.split(';') {
            let entry = entry.trim();
            if !entry.is_empty() {
                cookies.push(entry.to_owned());
            }
        }
    }

    // Format 2.0 carries single values only; keys fold to lower case and
    // a later duplicate overwrites the earlier value.
    let mut single = HashMap::new();
    let mut user_agent = String::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        let name = name.as_str().to_ascii_lowercase();
        if name == "user-agent" {
            user_agent = value.to_owned();
        }
        single.insert(name, value.to_owned());
    }
    single.entry("host".to_owned()).or_insert_with(|| host.clone());

    single.insert("x-amzn-trace-id".to_owned(), TRACE_ID_PLACEHOLDER.to_owned());
    single.insert("x-forwarded-for".to_owned(), remote_ip.to_string());
    single.insert("x-forwarded-port".to_owned(), config.port.to_string());
    single.insert("x-forwarded-proto".to_owned(), config.scheme().to_owned());

    let mut query = HashMap::new();
    for (key, value) in query_pairs(uri) {
        query.insert(key, value);
    }

    let (body, is_base64_encoded) = encode_body(body);

    ProxyRequestEventV2 {
        version: "2.0".to_owned(),
        route_key: "$default".to_owned(),
        raw_path: path.clone(),
        raw_query_string: uri.query().unwrap_or_default().to_owned(),
        cookies,
        headers: single,
        query_string_parameters: query,
        path_parameters: HashMap::new(),
        request_context: RequestContextV2 {
            route_key: "$default".to_owned(),
            account_id: "anonymous".to_owned(),
            stage: "$default".to_owned(),
            request_id: "todo".to_owned(),
            api_id: domain_name.clone(),
            domain_name: domain_name.clone(),
            domain_prefix: domain_name,
            time: now.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            time_epoch: now.timestamp_millis(),
            http: HttpDescriptor {
                method: method.as_str().to_owned(),
                path,
                protocol: format!("{version:?}"),
                source_ip: remote_ip.to_string(),
                user_agent,
            },
        },
        body,
        is_base64_encoded,
    }
}
