//! Zeroization coverage.
//!
//! Key material must not linger after use. The zeroize crate's
//! `ZeroizeOnDrop` is the mechanism; these tests pin the trait bounds so a
//! type silently losing its derive fails the build, and exercise the drop
//! paths.

use pawl::{ChainKey, DjbSha256, KeyPair, MessageKey, RootKey, Session, Suite};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Compile-time check that the secret-bearing types wipe themselves.
#[test]
fn secret_types_zeroize_on_drop() {
    fn assert_zeroize_on_drop<T: zeroize::ZeroizeOnDrop>() {}

    assert_zeroize_on_drop::<KeyPair>();
    assert_zeroize_on_drop::<RootKey>();
    assert_zeroize_on_drop::<ChainKey>();
    assert_zeroize_on_drop::<MessageKey>();
}

#[test]
fn key_material_drops_cleanly() {
    let suite = DjbSha256::new("zeroize");
    let pair = suite.generate(&mut OsRng).unwrap();

    let (ck, mk) = suite.kdf_ck(&ChainKey::from_bytes([1u8; 32]));
    drop(ck);
    drop(mk);
    drop(pair);
}

/// Decrypted plaintext is handed out in a self-wiping buffer.
#[test]
fn plaintext_buffers_are_zeroizing() {
    let sk = [1u8; 32];
    let suite = DjbSha256::new("zeroize");
    let bob_pair = suite.generate(&mut OsRng).unwrap();
    let bob_public = suite.public(&bob_pair);

    let mut alice = Session::new_send(suite.clone(), &sk, bob_public, &mut OsRng).unwrap();
    let mut bob = Session::new_recv(suite, &sk, bob_pair);

    let msg = alice.seal(b"secret", b"").unwrap();
    let plaintext: Zeroizing<Vec<u8>> = bob.open(&msg, b"", &mut OsRng).unwrap();
    assert_eq!(&plaintext[..], b"secret");
    drop(plaintext);
}

/// State snapshots carry private keys, so they wipe on drop as well.
#[test]
fn state_snapshots_are_zeroizing() {
    let sk = [2u8; 32];
    let suite = DjbSha256::new("zeroize");
    let bob_pair = suite.generate(&mut OsRng).unwrap();
    let bob_public = suite.public(&bob_pair);

    let alice = Session::new_send(suite, &sk, bob_public, &mut OsRng).unwrap();
    let snapshot: Zeroizing<Vec<u8>> = alice.state().encode();
    drop(snapshot);
}
