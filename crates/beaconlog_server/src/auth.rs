//! Shared access key for the retrieval endpoints.
//!
//! There is exactly one credential. Candidates are compared by SHA-256
//! digest with a constant-time fold, so neither the key length nor the
//! position of the first mismatch leaks through timing.

use crate::error::{ServerError, ServerResult};
use sha2::{Digest, Sha256};
use std::fmt;

/// The shared retrieval credential.
#[derive(Clone)]
pub struct AccessKey {
    digest: [u8; 32],
}

impl AccessKey {
    /// Creates an access key from its secret.
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    /// Checks a candidate key.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Unauthorized`] if the candidate does not match.
    pub fn verify(&self, candidate: &str) -> ServerResult<()> {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        let diff = self
            .digest
            .iter()
            .zip(candidate.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(ServerError::Unauthorized)
        }
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(<redacted>)")
    }
}
