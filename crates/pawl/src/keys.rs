//! Key material handled by suites and sessions.
//!
//! All secret-bearing types zeroize themselves on drop. [`PublicKey`] is
//! plain data in the suite's canonical wire form.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A complete Diffie-Hellman key pair in a suite-defined opaque layout.
///
/// The byte string contains both the private scalar and the public point,
/// so a pair recovered from persisted state needs no recomputation. For the
/// X25519 suites it is the 32-byte scalar followed by the 32-byte point;
/// for the NIST suites the scalar is followed by the SEC1 compressed point.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair(Vec<u8>);

impl KeyPair {
    /// Wraps raw key-pair bytes in the owning suite's layout.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw key-pair bytes. Contains the private scalar; handle with care.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A peer's ratchet public key in the suite's canonical wire form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Wraps raw public-key bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw public-key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Constant-time equality.
    ///
    /// Used where comparing against an attacker-supplied key, such as
    /// deciding whether an incoming header announces a new ratchet chain.
    #[must_use]
    pub fn ct_eq(&self, other: &PublicKey) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl From<&[u8]> for PublicKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// A 32-byte root-chain key.
///
/// Accumulates entropy from every Diffie-Hellman ratchet and seeds each new
/// chain key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RootKey([u8; 32]);

impl RootKey {
    /// Wraps raw root-key bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw root-key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A 32-byte sending- or receiving-chain key.
///
/// Keys the per-message KDF; advanced one step per message.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ChainKey([u8; 32]);

impl ChainKey {
    /// Wraps raw chain-key bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw chain-key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A 32-byte single-use message key.
///
/// Produced by one chain step and consumed by exactly one seal or open.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MessageKey([u8; 32]);

impl MessageKey {
    /// Wraps raw message-key bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw message-key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
