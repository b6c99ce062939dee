/*
[INPUT]:  Stream paths, handler channels and listen keys
[OUTPUT]: Normalized market and user-data push events
[POS]:    WebSocket layer - push-stream subscriptions
[UPDATE]: When adding new streams or changing connection logic
*/

pub mod client;
pub mod message;
pub mod streams;
pub mod user_data;

pub use client::{StreamConfig, StreamHandle, StreamSender, VoptionWebSocket};
pub use message::{PLAINTEXT_MODE_REQUEST, parse_frame};
pub use user_data::{DEFAULT_KEEP_ALIVE_INTERVAL, UserDataSession, UserDataStatus};
