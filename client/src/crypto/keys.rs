//! # Key Material
//!
//! Ed25519 secret keys, public keys, and signatures.
//!
//! The rest of the client never looks inside these types. It only asks a
//! [`Signer`] for its public key and for signatures over body bytes, so an
//! HSM- or remote-backed signer can stand in for [`SecretKey`].
//!
//! ## String forms
//!
//! - Secret keys render as hex-encoded PKCS#8 DER
//!   (`302e020100300506032b657004220420` followed by the 32-byte seed).
//! - Public keys render as hex-encoded SubjectPublicKeyInfo DER
//!   (`302a300506032b6570032100` followed by the 32-byte point).
//!
//! Parsing accepts either the DER form or the bare 32-byte hex.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use ed25519_dalek::{Signature as DalekSignature, Signer as _, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const KEY_LENGTH: usize = 32;
const SIGNATURE_LENGTH: usize = 64;

/// PKCS#8 `PrivateKeyInfo` header for an Ed25519 seed.
const SECRET_KEY_DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// `SubjectPublicKeyInfo` header for an Ed25519 point.
const PUBLIC_KEY_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Errors that can occur during key operations.
///
/// Deliberately vague: the message never echoes key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key encoding")]
    InvalidSecretKey,

    #[error("invalid public key encoding or not a valid Ed25519 point")]
    InvalidPublicKey,
}

// ---------------------------------------------------------------------------
// Signer capability
// ---------------------------------------------------------------------------

/// Anything that can authorize a transaction.
pub trait Signer {
    /// The public half of the signing key.
    fn public_key(&self) -> PublicKey;

    /// Signs `message` and returns the signature.
    fn sign(&self, message: &[u8]) -> Signature;
}

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// An Ed25519 secret key.
///
/// Not `Serialize`: exporting a secret should be a deliberate call to
/// [`to_bytes`](Self::to_bytes) or `to_string()`, never a side effect of
/// serializing some larger structure.
pub struct SecretKey {
    signing_key: SigningKey,
}

impl SecretKey {
    /// Generates a fresh key from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Builds a key from its 32-byte seed.
    pub fn from_bytes(seed: &[u8; KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The 32-byte seed. Handle with care.
    pub fn to_bytes(&self) -> [u8; KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Derives the matching public key.
    pub fn public(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Signs `message`.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }
}

impl Signer for SecretKey {
    fn public_key(&self) -> PublicKey {
        self.public()
    }

    fn sign(&self, message: &[u8]) -> Signature {
        SecretKey::sign(self, message)
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        Self::from_bytes(&self.signing_key.to_bytes())
    }
}

impl PartialEq for SecretKey {
    /// Compares public halves only.
    fn eq(&self, other: &Self) -> bool {
        self.public() == other.public()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(pub={})", self.public())
    }
}

/// Hex-encoded PKCS#8 DER.
impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut der = SECRET_KEY_DER_PREFIX.to_vec();
        der.extend_from_slice(&self.to_bytes());
        f.write_str(&hex::encode(der))
    }
}

impl FromStr for SecretKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed = strip_der_prefix(&bytes, &SECRET_KEY_DER_PREFIX)
            .ok_or(KeyError::InvalidSecretKey)?;
        Ok(Self::from_bytes(&seed))
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// An Ed25519 public key. Always a valid curve point, including when
/// decoded off the wire.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyBytes")]
pub struct PublicKey {
    #[serde(with = "hex")]
    bytes: [u8; KEY_LENGTH],
}

/// Unchecked wire form of [`PublicKey`].
#[derive(Deserialize)]
struct PublicKeyBytes {
    #[serde(with = "hex")]
    bytes: [u8; KEY_LENGTH],
}

impl TryFrom<PublicKeyBytes> for PublicKey {
    type Error = KeyError;

    fn try_from(raw: PublicKeyBytes) -> Result<Self, KeyError> {
        Self::from_bytes(&raw.bytes)
    }
}

impl PublicKey {
    /// Validates and wraps a raw 32-byte point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }

    /// Returns `true` if `signature` is a valid signature of `message`
    /// under this key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature.as_bytes()) else {
            return false;
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

/// Hex-encoded SubjectPublicKeyInfo DER.
impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut der = PUBLIC_KEY_DER_PREFIX.to_vec();
        der.extend_from_slice(&self.bytes);
        f.write_str(&hex::encode(der))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &hex::encode(self.bytes)[..16])
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        let point = strip_der_prefix(&bytes, &PUBLIC_KEY_DER_PREFIX)
            .ok_or(KeyError::InvalidPublicKey)?;
        Self::from_bytes(&point)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A detached Ed25519 signature.
///
/// Stored as a byte vector so malformed signatures received off the wire
/// can be represented; such a signature simply fails verification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "hex")]
    bytes: Vec<u8>,
}

impl Signature {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.bytes))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = hex::encode(&self.bytes);
        write!(f, "Signature({}...)", &hex_str[..hex_str.len().min(16)])
    }
}

/// Returns the trailing key bytes of either a bare 32-byte key or one
/// wrapped in the expected DER header.
fn strip_der_prefix(bytes: &[u8], prefix: &[u8]) -> Option<[u8; KEY_LENGTH]> {
    let raw = match bytes.len() {
        KEY_LENGTH => bytes,
        n if n == prefix.len() + KEY_LENGTH && bytes.starts_with(prefix) => &bytes[prefix.len()..],
        _ => return None,
    };
    raw.try_into().ok()
}
