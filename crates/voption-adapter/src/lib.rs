/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public options-exchange adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod normalize;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{DriftClock, QuerySigner};

// Re-export commonly used types from http
pub use http::{
    Credentials,
    QueryArg,
    QueryParams,
    RestConfig,
    Result,
    VoptionClient,
    VoptionError,
};

pub use normalize::{PayloadKind, normalize, normalize_route, normalize_stream};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{StreamConfig, StreamHandle, StreamSender, UserDataStatus, VoptionWebSocket};
