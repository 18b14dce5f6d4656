//! The cryptographic-suite contract.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::header::{concat, Header};
use crate::{ChainKey, Error, KeyPair, MessageKey, PublicKey, RootKey};

/// HKDF info suffix for root-chain derivation.
pub(crate) const RATCHET_LABEL: &str = "Ratchet";
/// HKDF info suffix for message-key expansion.
pub(crate) const MESSAGE_KEYS_LABEL: &str = "MessageKeys";

/// A concrete set of primitives parameterising a ratchet session: a
/// Diffie-Hellman group, an AEAD, and the HKDF/HMAC hash.
///
/// Suites are stateless values; a [`Session`](crate::Session) calls through
/// this trait for every cryptographic operation and never inspects which
/// suite it holds. Implementations are cheap to clone and freely shareable
/// across threads.
///
/// Both parties of a conversation must construct the same suite with the
/// same namespace; the namespace domain-separates derived keys between
/// applications that share a wire format.
pub trait Suite {
    /// Creates a new Diffie-Hellman key pair from the supplied randomness
    /// source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomFailed`] when the randomness source fails.
    fn generate<G: RngCore + CryptoRng>(&self, rng: &mut G) -> Result<KeyPair, Error>;

    /// Returns a copy of the public portion of the key pair.
    fn public(&self, pair: &KeyPair) -> PublicKey;

    /// Computes the raw Diffie-Hellman value for the key pair and peer
    /// public key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPoint`] when the peer key does not decode on
    /// the curve or is a small-order element.
    fn dh(&self, pair: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>, Error>;

    /// Root-chain KDF: mixes a Diffie-Hellman output into the root key and
    /// returns the next root key plus a fresh chain key.
    fn kdf_rk(&self, rk: &RootKey, dh: &[u8]) -> (RootKey, ChainKey);

    /// Symmetric-chain KDF: advances the chain key one step and derives the
    /// message key for the current position.
    fn kdf_ck(&self, ck: &ChainKey) -> (ChainKey, MessageKey);

    /// Encrypts and authenticates `plaintext`, additionally authenticating
    /// `additional_data`. The ciphertext carries the authentication tag.
    ///
    /// The AEAD key and nonce are derived from the message key; because a
    /// message key is used exactly once, the nonce needs no transmission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncryptionFailed`] when the AEAD rejects the input.
    fn seal(
        &self,
        key: &MessageKey,
        plaintext: &[u8],
        additional_data: &[u8],
    ) -> Result<Vec<u8>, Error>;

    /// Decrypts and authenticates `ciphertext`, additionally authenticating
    /// `additional_data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecryptionFailed`] when authentication fails.
    fn open(
        &self,
        key: &MessageKey,
        ciphertext: &[u8],
        additional_data: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Error>;

    /// Builds a message header carrying the pair's public ratchet key, the
    /// previous chain length, and the current message number.
    fn header(&self, pair: &KeyPair, pn: u64, n: u64) -> Header {
        Header {
            public_key: self.public(pair),
            pn,
            n,
        }
    }

    /// Produces the associated-data byte string actually bound into the
    /// AEAD, keeping caller data and header unambiguously separable.
    ///
    /// The default is [`concat`]; override only with another injective
    /// encoding that both peers share.
    fn concat(&self, additional_data: &[u8], header: &Header) -> Vec<u8> {
        concat(additional_data, header)
    }
}
