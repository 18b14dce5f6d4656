//! NIST-curve suite: ECDH on a caller-supplied curve, AES-256-GCM, and
//! HKDF/HMAC over a caller-supplied hash.

use std::marker::PhantomData;

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use digest::{core_api::BlockSizeUser, Digest};
use elliptic_curve::{
    ecdh::diffie_hellman,
    generic_array::typenum::Unsigned,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize, SecretKey,
};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::kdf;
use crate::suite::{Suite, MESSAGE_KEYS_LABEL, RATCHET_LABEL};
use crate::{ChainKey, Error, KeyPair, MessageKey, PublicKey, RootKey};

/// AES-256-GCM key size in bytes.
const KEY_LEN: usize = 32;
/// AES-GCM nonce size in bytes.
const NONCE_LEN: usize = 12;

/// The NIST suite over curve `C` and hash `D`: ECDH key exchange with
/// AES-256-GCM encryption.
///
/// `C` is any curve implementing the `elliptic-curve` arithmetic traits
/// (P-256 being the usual choice, see [`NistP256`]). Public keys travel in
/// SEC1 compressed form; the Diffie-Hellman value is the x coordinate
/// left-padded to the curve's byte length. `D` instantiates HKDF and HMAC
/// and must produce at least 32 bytes of output.
#[derive(Clone)]
pub struct Nist<C, D> {
    rk_info: Vec<u8>,
    mk_info: Vec<u8>,
    _curve: PhantomData<C>,
    _hash: PhantomData<D>,
}

/// The NIST suite instantiated for P-256 with SHA-256.
pub type NistP256 = Nist<p256::NistP256, Sha256>;

impl<C, D> Nist<C, D>
where
    C: CurveArithmetic,
{
    /// Creates the suite bound to an application namespace.
    ///
    /// The namespace prefixes the HKDF info labels, separating keys derived
    /// by different applications from the same secrets.
    #[must_use]
    pub fn new(namespace: &str) -> Self {
        Self {
            rk_info: format!("{namespace}{RATCHET_LABEL}").into_bytes(),
            mk_info: format!("{namespace}{MESSAGE_KEYS_LABEL}").into_bytes(),
            _curve: PhantomData,
            _hash: PhantomData,
        }
    }

    /// Private scalar length in bytes.
    fn scalar_len() -> usize {
        FieldBytesSize::<C>::USIZE
    }

    /// SEC1 compressed point length in bytes.
    fn point_len() -> usize {
        1 + Self::scalar_len()
    }
}

impl<C, D> Suite for Nist<C, D>
where
    C: CurveArithmetic,
    D: Digest + BlockSizeUser + Clone,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    fn generate<G: RngCore + CryptoRng>(&self, rng: &mut G) -> Result<KeyPair, Error> {
        let secret = SecretKey::<C>::random(rng);
        let point = secret.public_key().to_encoded_point(true);
        let mut scalar = secret.to_bytes();

        let mut bytes = Vec::with_capacity(Self::scalar_len() + point.as_bytes().len());
        bytes.extend_from_slice(scalar.as_slice());
        bytes.extend_from_slice(point.as_bytes());
        scalar.as_mut_slice().zeroize();
        Ok(KeyPair::new(bytes))
    }

    fn public(&self, pair: &KeyPair) -> PublicKey {
        let bytes = pair.as_bytes();
        assert_eq!(
            bytes.len(),
            Self::scalar_len() + Self::point_len(),
            "invalid key pair size: {}",
            bytes.len()
        );
        PublicKey::new(bytes[Self::scalar_len()..].to_vec())
    }

    fn dh(&self, pair: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>, Error> {
        let bytes = pair.as_bytes();
        assert_eq!(
            bytes.len(),
            Self::scalar_len() + Self::point_len(),
            "invalid key pair size: {}",
            bytes.len()
        );
        let secret = SecretKey::<C>::from_slice(&bytes[..Self::scalar_len()])
            .expect("key pair holds a valid scalar");
        let peer = elliptic_curve::PublicKey::<C>::from_sec1_bytes(peer.as_bytes())
            .map_err(|_| Error::InvalidPoint)?;

        let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
        Ok(Zeroizing::new(shared.raw_secret_bytes().as_slice().to_vec()))
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

        let cipher = Aes256Gcm::new_from_slice(aead_key).expect("derived key is 32 bytes");
        cipher
            .encrypt(
                Nonce::from_slice(nonce),
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

        let cipher = Aes256Gcm::new_from_slice(aead_key).expect("derived key is 32 bytes");
        cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: additional_data,
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| Error::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;

    #[test]
    fn key_pair_layout() {
        let suite = NistP256::new("test");
        let pair = suite.generate(&mut OsRng).unwrap();

        // P-256: 32-byte scalar plus 33-byte compressed point.
        assert_eq!(pair.as_bytes().len(), 32 + 33);
        let public = suite.public(&pair);
        assert_eq!(public.as_bytes().len(), 33);
        assert!(matches!(public.as_bytes()[0], 0x02 | 0x03));
    }

    #[test]
    fn dh_agreement() {
        let suite = NistP256::new("test");
        let alice = suite.generate(&mut OsRng).unwrap();
        let bob = suite.generate(&mut OsRng).unwrap();

        let ab = suite.dh(&alice, &suite.public(&bob)).unwrap();
        let ba = suite.dh(&bob, &suite.public(&alice)).unwrap();
        assert_eq!(&ab[..], &ba[..]);
        assert_eq!(ab.len(), 32);
    }

    #[test]
    fn dh_rejects_undecodable_point() {
        let suite = NistP256::new("test");
        let pair = suite.generate(&mut OsRng).unwrap();

        let garbage = PublicKey::new(vec![0xffu8; 33]);
        assert!(matches!(
            suite.dh(&pair, &garbage),
            Err(Error::InvalidPoint)
        ));

        let short = PublicKey::new(vec![2u8; 5]);
        assert!(matches!(suite.dh(&pair, &short), Err(Error::InvalidPoint)));
    }

    #[test]
    fn seal_open_round_trip() {
        let suite = NistP256::new("test");
        let mk = MessageKey::from_bytes([6u8; 32]);

        let ciphertext = suite.seal(&mk, b"plaintext", b"aad").unwrap();
        let plaintext = suite.open(&mk, &ciphertext, b"aad").unwrap();
        assert_eq!(&plaintext[..], b"plaintext");
    }

    #[test]
    fn open_rejects_tampered_aad() {
        let suite = NistP256::new("test");
        let mk = MessageKey::from_bytes([6u8; 32]);
        let ciphertext = suite.seal(&mk, b"plaintext", b"aad").unwrap();
        assert!(matches!(
            suite.open(&mk, &ciphertext, b"tampered"),
            Err(Error::DecryptionFailed)
        ));
    }
}
