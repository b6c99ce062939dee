/*
[INPUT]:  Canonical query strings and the API secret
[OUTPUT]: Hex-encoded HMAC-SHA256 signatures
[POS]:    Auth layer - request signing for SIGNED endpoints
[UPDATE]: When changing signing algorithm or digest encoding
*/

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer keyed by the API secret
#[derive(Clone)]
pub struct QuerySigner {
    secret: String,
}

impl QuerySigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a canonical query string, returning 64 lowercase hex characters
    pub fn sign(&self, canonical_query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(canonical_query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for QuerySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}
