//! Library error types.

use thiserror::Error;

/// Errors surfaced by sessions, suites, and stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Peer public key does not decode on the curve or is a small-order
    /// element.
    #[error("invalid peer public key")]
    InvalidPoint,

    /// AEAD encryption failed.
    #[error("encryption failed")]
    EncryptionFailed,

    /// The message could not be decrypted.
    ///
    /// Deliberately opaque: authentication failures and messages addressed
    /// to an unknown chain are indistinguishable to the caller.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The skipped-message-key store is saturated.
    #[error("too many skipped messages")]
    TooManySkipped,

    /// Randomness source failed.
    #[error("random number generation failed")]
    RandomFailed,

    /// A message header was too short to decode.
    #[error("invalid header encoding")]
    InvalidHeader,

    /// A state snapshot failed to decode.
    #[error("invalid state snapshot")]
    InvalidState,

    /// Opaque persistence failure reported by a [`Store`](crate::Store).
    #[error("store: {0}")]
    Store(String),
}
