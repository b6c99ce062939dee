/*
[INPUT]:  Endpoint catalog entries and stream frames
[OUTPUT]: Request descriptors and inbound stream events
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the request descriptor or stream event shape changes
*/

use reqwest::Method;
use serde_json::Value;

use super::enums::SecurityLevel;

/// Fixed (route, security, method) triple describing one exchange endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub route: &'static str,
    pub security: SecurityLevel,
    pub method: Method,
}

impl Endpoint {
    pub const fn public(route: &'static str) -> Self {
        Self {
            route,
            security: SecurityLevel::None,
            method: Method::GET,
        }
    }

    pub const fn api_key(route: &'static str, method: Method) -> Self {
        Self {
            route,
            security: SecurityLevel::ApiKey,
            method,
        }
    }

    pub const fn signed(route: &'static str, method: Method) -> Self {
        Self {
            route,
            security: SecurityLevel::Signed,
            method,
        }
    }

    /// Last path segment, used to pick the response normalization
    pub fn route_type(&self) -> &'static str {
        route_type(self.route)
    }
}

/// Last non-empty path segment of a route
pub fn route_type(route: &str) -> &str {
    route
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(route)
}

/// One inbound frame delivered to a stream handler
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Structured (and normalized) payload
    Json(Value),
    /// Payload that failed to parse, passed through verbatim
    Raw(String),
}

impl StreamEvent {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StreamEvent::Json(value) => Some(value),
            StreamEvent::Raw(_) => None,
        }
    }
}
