use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::TradeQuote;

/// Content-derived identity of a quote. Two quotes with the same content
/// share an identity; any change in content yields a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteIdentity(String);

/// Feeds `Hash` output into a SHA-256 digest.
struct DigestHasher(Sha256);

impl Hasher for DigestHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finish(&self) -> u64 {
        // only the full digest is used
        0
    }
}

impl QuoteIdentity {
    pub fn of(quote: &TradeQuote) -> Self {
        let mut hasher = DigestHasher(Sha256::new());
        quote.hash(&mut hasher);
        Self(hex::encode(hasher.0.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
