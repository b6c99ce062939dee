/*
[INPUT]:  Exchange endpoint requirements and venue selection
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When adding security levels or venues
*/

use serde::{Deserialize, Serialize};

/// Per-endpoint authentication requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    /// No key, no signature
    None,
    /// API-key header only
    ApiKey,
    /// HMAC signature plus API-key header
    Signed,
}

impl SecurityLevel {
    pub fn requires_api_key(self) -> bool {
        matches!(self, SecurityLevel::ApiKey | SecurityLevel::Signed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::None => "NONE",
            SecurityLevel::ApiKey => "API_KEY",
            SecurityLevel::Signed => "SIGNED",
        }
    }
}

/// Which exchange product the REST base URL points at.
///
/// Ping, time and user-data-stream routes differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Spot,
    #[default]
    Options,
}
