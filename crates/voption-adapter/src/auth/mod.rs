/*
[INPUT]:  API secret and local/exchange clock samples
[OUTPUT]: Query signatures and drift-corrected timestamps
[POS]:    Auth layer - signing and clock-drift estimation
[UPDATE]: When signing or timestamping rules change
*/

pub mod clock;
pub mod signer;

pub use clock::{ClockFn, DriftClock, now_ms};
pub use signer::QuerySigner;
