//! # pawl
//!
//! Double Ratchet session core: asymmetric-plus-symmetric key ratcheting
//! for asynchronous two-party conversations.
//!
//! Starting from a pre-negotiated 32-byte shared secret and the responder's
//! initial ratchet public key, two [`Session`]s exchange messages where
//! every message is sealed under a fresh one-shot key. Compromising a single
//! message key exposes neither earlier traffic (forward secrecy) nor later
//! traffic once a Diffie-Hellman ratchet has fired (post-compromise
//! secrecy). Out-of-order delivery within a chain is tolerated up to a
//! configurable skip bound.
//!
//! ## Construction
//!
//! Each party runs three KDF chains. The *root chain* absorbs a fresh
//! Diffie-Hellman output whenever a peer announces a new ratchet public key,
//! producing a new root key plus a sending or receiving chain key. The
//! *sending* and *receiving chains* advance one HMAC step per message, each
//! step emitting a single-use message key. One party's sending chain is the
//! other's receiving chain, so the two stay in lockstep as long as every new
//! peer public key is eventually observed.
//!
//! ## Cryptographic suites
//!
//! All primitive choices are carried by a [`Suite`] value; the session logic
//! never inspects which one it holds.
//!
//! | Suite | Key exchange | AEAD | KDF/MAC hash |
//! |-------|--------------|------|--------------|
//! | [`DjbSha256`] | X25519 | `XChaCha20-Poly1305` | SHA-256 |
//! | [`DjbBlake2b256`] | X25519 | `XChaCha20-Poly1305` | BLAKE2b-256 |
//! | [`Nist<C, D>`](Nist) | ECDH on `C` (e.g. [`NistP256`]) | AES-256-GCM | caller-chosen `D` |
//!
//! The two X25519 suites are wire-incompatible with each other; an
//! application namespace picks one hash and stays with it.
//!
//! ## Usage
//!
//! ```ignore
//! use pawl::{DjbSha256, Session, Suite};
//! use rand::rngs::OsRng;
//!
//! let sk = [0u8; 32]; // negotiated out of band, e.g. via X3DH
//! let bob_pair = DjbSha256::new("example").generate(&mut OsRng)?;
//! let bob_public = DjbSha256::new("example").public(&bob_pair);
//!
//! let mut alice = Session::new_send(DjbSha256::new("example"), &sk, bob_public, &mut OsRng)?;
//! let mut bob = Session::new_recv(DjbSha256::new("example"), &sk, bob_pair);
//!
//! let msg = alice.seal(b"hello", b"header-meta")?;
//! let plaintext = bob.open(&msg, b"header-meta", &mut OsRng)?;
//! assert_eq!(&plaintext[..], b"hello");
//! ```
//!
//! ## What this crate does not do
//!
//! Transport, the initial key agreement that produces the shared secret,
//! encrypted headers, and group messaging are all out of scope. Replay of a
//! message whose skipped key is still cached will decrypt twice; callers
//! needing replay protection must de-duplicate envelopes themselves.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

mod djb;
mod error;
mod header;
mod kdf;
mod keys;
mod nist;
mod session;
mod state;
mod store;
mod suite;

pub use djb::{Blake2b256, Djb, DjbBlake2b256, DjbSha256};
pub use error::Error;
pub use header::{concat, Header};
pub use keys::{ChainKey, KeyPair, MessageKey, PublicKey, RootKey};
pub use nist::{Nist, NistP256};
pub use session::{Message, Session};
pub use state::State;
pub use store::{MemoryStore, Store, DEFAULT_MAX_SKIP};
pub use suite::Suite;
