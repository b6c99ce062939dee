/*
[INPUT]:  REST configuration, credentials and catalog query arguments
[OUTPUT]: Normalized exchange payloads and typed errors
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod option;
pub mod public;
pub mod query;
pub mod trade;
pub mod user;
pub mod user_stream;

pub use error::{
    INVALID_LISTEN_KEY, INVALID_SIGNATURE, Result, TIMESTAMP_AHEAD_OF_SERVER, VoptionError,
};
pub use query::{QueryArg, QueryParams};

pub use client::{API_KEY_HEADER, Credentials, DEFAULT_BASE_URL, RestConfig, VoptionClient};
