//! Curve25519 suite: X25519, `XChaCha20-Poly1305`, and HKDF/HMAC over a
//! caller-chosen 32-byte hash.

use std::marker::PhantomData;

use blake2::Blake2b;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use digest::{consts::U32, core_api::BlockSizeUser, Digest};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

use crate::kdf;
use crate::suite::{Suite, MESSAGE_KEYS_LABEL, RATCHET_LABEL};
use crate::{ChainKey, Error, KeyPair, MessageKey, PublicKey, RootKey};

/// BLAKE2b with 256-bit output.
pub type Blake2b256 = Blake2b<U32>;

/// X25519 scalar size in bytes.
const SCALAR_LEN: usize = 32;
/// Curve25519 point size in bytes.
const POINT_LEN: usize = 32;
/// `XChaCha20-Poly1305` key size in bytes.
const KEY_LEN: usize = 32;
/// `XChaCha20-Poly1305` nonce size in bytes.
const NONCE_LEN: usize = 24;

/// The Curve25519 suite over hash `D`: X25519 key exchange with
/// `XChaCha20-Poly1305` encryption.
///
/// `D` instantiates both HKDF and HMAC and must produce at least 32 bytes
/// of output. The [`DjbSha256`] and [`DjbBlake2b256`] instantiations are
/// wire-incompatible with each other; a namespace must pick one and stay
/// with it.
#[derive(Clone)]
pub struct Djb<D = Sha256> {
    rk_info: Vec<u8>,
    mk_info: Vec<u8>,
    _hash: PhantomData<D>,
}

/// The Curve25519 suite with SHA-256.
pub type DjbSha256 = Djb<Sha256>;

/// The Curve25519 suite with BLAKE2b-256.
pub type DjbBlake2b256 = Djb<Blake2b256>;

impl<D> Djb<D> {
    /// Creates the suite bound to an application namespace.
    ///
    /// The namespace prefixes the HKDF info labels, separating keys derived
    /// by different applications from the same secrets.
    #[must_use]
    pub fn new(namespace: &str) -> Self {
        Self {
            rk_info: format!("{namespace}{RATCHET_LABEL}").into_bytes(),
            mk_info: format!("{namespace}{MESSAGE_KEYS_LABEL}").into_bytes(),
            _hash: PhantomData,
        }
    }
}

impl<D> Suite for Djb<D>
where
    D: Digest + BlockSizeUser + Clone,
{
    fn generate<G: RngCore + CryptoRng>(&self, rng: &mut G) -> Result<KeyPair, Error> {
        let mut scalar = Zeroizing::new([0u8; SCALAR_LEN]);
        rng.try_fill_bytes(scalar.as_mut_slice())
            .map_err(|_| Error::RandomFailed)?;

        // RFC 7748 clamping.
        scalar[0] &= 248;
        scalar[31] &= 127;
        scalar[31] |= 64;

        let secret = StaticSecret::from(*scalar);
        let public = x25519_dalek::PublicKey::from(&secret);

        let mut bytes = Vec::with_capacity(SCALAR_LEN + POINT_LEN);
        bytes.extend_from_slice(&secret.to_bytes());
        bytes.extend_from_slice(public.as_bytes());
        Ok(KeyPair::new(bytes))
    }

    fn public(&self, pair: &KeyPair) -> PublicKey {
        let bytes = pair.as_bytes();
        assert_eq!(
            bytes.len(),
            SCALAR_LEN + POINT_LEN,
            "invalid key pair size: {}",
            bytes.len()
        );
        PublicKey::new(bytes[SCALAR_LEN..].to_vec())
    }

    fn dh(&self, pair: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>, Error> {
        let bytes = pair.as_bytes();
        assert_eq!(
            bytes.len(),
            SCALAR_LEN + POINT_LEN,
            "invalid key pair size: {}",
            bytes.len()
        );
        let point: [u8; POINT_LEN] = peer
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidPoint)?;

        let mut scalar = Zeroizing::new([0u8; SCALAR_LEN]);
        scalar.copy_from_slice(&bytes[..SCALAR_LEN]);
        let secret = StaticSecret::from(*scalar);

        let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(point));
        if !shared.was_contributory() {
            return Err(Error::InvalidPoint);
        }
        Ok(Zeroizing::new(shared.as_bytes().to_vec()))
    }

    fn kdf_rk(&self, rk: &RootKey, dh: &[u8]) -> (RootKey, ChainKey) {
        kdf::kdf_rk::<D>(rk, dh, &self.rk_info)
    }

    fn kdf_ck(&self, ck: &ChainKey) -> (ChainKey, MessageKey) {
        kdf::kdf_ck::<D>(ck)
    }

    fn seal(
        &self,
        key: &MessageKey,
        plaintext: &[u8],
        additional_data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let okm = kdf::kdf_mk::<D, { KEY_LEN + NONCE_LEN }>(key, &self.mk_info);
        let (aead_key, nonce) = okm.split_at(KEY_LEN);

        let cipher =
            XChaCha20Poly1305::new_from_slice(aead_key).expect("derived key is 32 bytes");
        cipher
            .encrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: plaintext,
                    aad: additional_data,
                },
            )
            .map_err(|_| Error::EncryptionFailed)
    }

    fn open(
        &self,
        key: &MessageKey,
        ciphertext: &[u8],
        additional_data: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        let okm = kdf::kdf_mk::<D, { KEY_LEN + NONCE_LEN }>(key, &self.mk_info);
        let (aead_key, nonce) = okm.split_at(KEY_LEN);

        let cipher =
            XChaCha20Poly1305::new_from_slice(aead_key).expect("derived key is 32 bytes");
        cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: additional_data,
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| Error::DecryptionFailed)
    }
}
