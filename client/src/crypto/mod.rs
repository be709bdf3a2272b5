//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around `ed25519-dalek` and `sha2`. The client core
//! only ever goes through the [`Signer`] capability and [`PublicKey::verify`];
//! nothing outside this module touches curve arithmetic.

pub mod keys;

pub use keys::{KeyError, PublicKey, SecretKey, Signature, Signer};

use sha2::{Digest, Sha384};

/// SHA-384 digest of `data`. Used for transaction hashes.
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let mut out = [0u8; 48];
    out.copy_from_slice(&Sha384::digest(data));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha384_known_vector() {
        // SHA-384("abc") from FIPS 180-2.
        assert_eq!(
            hex::encode(sha384(b"abc")),
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed\
             8086072ba1e7cc2358baeca134c825a7"
        );
    }
}
