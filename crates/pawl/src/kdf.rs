//! HKDF and HMAC derivation steps shared by the cryptographic suites.
//!
//! Every suite uses the same three derivations and differs only in the hash
//! that instantiates them, so the suites delegate here with their chosen
//! digest type parameter. The hash must produce at least 32 bytes of
//! output.

use digest::{core_api::BlockSizeUser, Digest};
use hkdf::SimpleHkdf;
use hmac::{Mac, SimpleHmac};
use zeroize::Zeroizing;

use crate::{ChainKey, MessageKey, RootKey};

/// HMAC input advancing a chain key one step.
const CHAIN_KEY_CONST: u8 = 0x02;
/// HMAC input deriving a message key from a chain key.
const MESSAGE_KEY_CONST: u8 = 0x01;

/// Root-chain step: HKDF with the root key as salt and the Diffie-Hellman
/// output as keying material, expanded to 64 bytes under `info` and split
/// into the next root key and a fresh chain key.
pub(crate) fn kdf_rk<D>(rk: &RootKey, dh: &[u8], info: &[u8]) -> (RootKey, ChainKey)
where
    D: Digest + BlockSizeUser + Clone,
{
    let hk = SimpleHkdf::<D>::new(Some(rk.as_bytes()), dh);
    let mut okm = Zeroizing::new([0u8; 64]);
    hk.expand(info, &mut okm[..])
        .expect("64 bytes is a valid HKDF output length");

    let mut next_rk = [0u8; 32];
    next_rk.copy_from_slice(&okm[..32]);
    let mut ck = [0u8; 32];
    ck.copy_from_slice(&okm[32..]);
    (RootKey::from_bytes(next_rk), ChainKey::from_bytes(ck))
}

/// Symmetric-chain step: the next chain key and the message key are
/// independent HMAC outputs under the current chain key, not a single HKDF
/// expansion.
pub(crate) fn kdf_ck<D>(ck: &ChainKey) -> (ChainKey, MessageKey)
where
    D: Digest + BlockSizeUser + Clone,
{
    let next = hmac_label::<D>(ck, CHAIN_KEY_CONST);
    let mk = hmac_label::<D>(ck, MESSAGE_KEY_CONST);
    (ChainKey::from_bytes(next), MessageKey::from_bytes(mk))
}

/// Expands a message key into AEAD key-plus-nonce material: HKDF with an
/// empty salt under `info`. The caller splits the output; it is wiped when
/// dropped.
pub(crate) fn kdf_mk<D, const LEN: usize>(mk: &MessageKey, info: &[u8]) -> Zeroizing<[u8; LEN]>
where
    D: Digest + BlockSizeUser + Clone,
{
    let hk = SimpleHkdf::<D>::new(None, mk.as_bytes());
    let mut okm = Zeroizing::new([0u8; LEN]);
    hk.expand(info, &mut okm[..])
        .expect("AEAD material is a valid HKDF output length");
    okm
}

fn hmac_label<D>(ck: &ChainKey, label: u8) -> [u8; 32]
where
    D: Digest + BlockSizeUser + Clone,
{
    let mut mac = <SimpleHmac<D> as Mac>::new_from_slice(ck.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(&[label]);
    let tag = mac.finalize().into_bytes();
    let tag = tag.as_slice();
    assert!(tag.len() >= 32, "suite hash output is shorter than 32 bytes");

    let mut out = [0u8; 32];
    out.copy_from_slice(&tag[..32]);
    out
}

#[cfg(test)]
mod tests {
    use blake2::Blake2b;
    use digest::consts::U32;
    use sha2::Sha256;

    use super::*;

    #[test]
    fn kdf_rk_is_deterministic_and_advances() {
        let rk = RootKey::from_bytes([1u8; 32]);
        let dh = [2u8; 32];

        let (rk1, ck1) = kdf_rk::<Sha256>(&rk, &dh, b"testRatchet");
        let (rk2, ck2) = kdf_rk::<Sha256>(&rk, &dh, b"testRatchet");

        assert_eq!(rk1.as_bytes(), rk2.as_bytes());
        assert_eq!(ck1.as_bytes(), ck2.as_bytes());
        assert_ne!(rk1.as_bytes(), rk.as_bytes());
        assert_ne!(rk1.as_bytes(), ck1.as_bytes());
    }

    #[test]
    fn kdf_rk_separates_info_labels() {
        let rk = RootKey::from_bytes([1u8; 32]);
        let (a, _) = kdf_rk::<Sha256>(&rk, &[2u8; 32], b"appARatchet");
        let (b, _) = kdf_rk::<Sha256>(&rk, &[2u8; 32], b"appBRatchet");
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn kdf_ck_chain_and_message_keys_differ() {
        let ck = ChainKey::from_bytes([7u8; 32]);
        let (next, mk) = kdf_ck::<Sha256>(&ck);

        assert_ne!(next.as_bytes(), ck.as_bytes());
        assert_ne!(next.as_bytes(), mk.as_bytes());

        // Two steps never repeat a message key.
        let (_, mk2) = kdf_ck::<Sha256>(&next);
        assert_ne!(mk.as_bytes(), mk2.as_bytes());
    }

    #[test]
    fn kdf_ck_differs_per_hash() {
        let ck = ChainKey::from_bytes([7u8; 32]);
        let (_, sha) = kdf_ck::<Sha256>(&ck);
        let (_, blake) = kdf_ck::<Blake2b<U32>>(&ck);
        assert_ne!(sha.as_bytes(), blake.as_bytes());
    }

    #[test]
    fn kdf_mk_splits_key_and_nonce() {
        let mk = MessageKey::from_bytes([9u8; 32]);
        let okm = kdf_mk::<Sha256, 56>(&mk, b"testMessageKeys");
        let again = kdf_mk::<Sha256, 56>(&mk, b"testMessageKeys");
        assert_eq!(&okm[..], &again[..]);
        assert_ne!(&okm[..32], &[0u8; 32]);
    }
}
