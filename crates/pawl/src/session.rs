//! Ratchet sessions: sealing and opening messages.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::store::{MemoryStore, Store};
use crate::suite::Suite;
use crate::{Error, Header, KeyPair, PublicKey, RootKey, State};

/// A message sealed by a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Ratchet header, transmitted in the clear next to the ciphertext and
    /// authenticated through the associated-data binding.
    pub header: Header,
    /// AEAD ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

/// An asynchronous conversation between two parties.
///
/// A session pairs a [`Suite`] with the mutable ratchet [`State`] and a
/// [`Store`] for skipped keys and snapshots. [`seal`](Session::seal) and
/// [`open`](Session::open) mutate the state atomically: on any error the
/// committed state is unchanged.
///
/// A session is not safe for concurrent use; the `&mut self` receivers
/// serialise operations on a single session, and distinct sessions are
/// independent.
pub struct Session<R, S = MemoryStore> {
    suite: R,
    state: State,
    store: S,
}

impl<R: Suite> Session<R, MemoryStore> {
    /// Creates the initiating side of a conversation with an in-memory
    /// store.
    ///
    /// `sk` is the pre-negotiated 32-byte shared secret and `peer` the
    /// responder's published ratchet public key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPoint`] for an unusable peer key or
    /// [`Error::RandomFailed`] when key generation fails.
    pub fn new_send<G: RngCore + CryptoRng>(
        suite: R,
        sk: &[u8; 32],
        peer: PublicKey,
        rng: &mut G,
    ) -> Result<Self, Error> {
        Self::new_send_with_store(suite, sk, peer, MemoryStore::new(), rng)
    }

    /// Creates the responding side of a conversation with an in-memory
    /// store.
    ///
    /// `own` is the key pair whose public half the initiator used. No
    /// Diffie-Hellman is possible until the first message arrives, so the
    /// session starts without chain keys and the first
    /// [`open`](Session::open) performs the first ratchet.
    #[must_use]
    pub fn new_recv(suite: R, sk: &[u8; 32], own: KeyPair) -> Self {
        Self::new_recv_with_store(suite, sk, own, MemoryStore::new())
    }

    /// Continues a session from a persisted state snapshot with an
    /// in-memory store.
    #[must_use]
    pub fn resume(suite: R, state: State) -> Self {
        Self::resume_with_store(suite, state, MemoryStore::new())
    }
}

impl<R: Suite, S: Store> Session<R, S> {
    /// [`Session::new_send`] with a caller-supplied store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPoint`] for an unusable peer key or
    /// [`Error::RandomFailed`] when key generation fails.
    pub fn new_send_with_store<G: RngCore + CryptoRng>(
        suite: R,
        sk: &[u8; 32],
        peer: PublicKey,
        store: S,
        rng: &mut G,
    ) -> Result<Self, Error> {
        let dhs = suite.generate(rng)?;
        let dh = suite.dh(&dhs, &peer)?;
        let (rk, cks) = suite.kdf_rk(&RootKey::from_bytes(*sk), &dh);
        Ok(Self {
            suite,
            state: State {
                dhs,
                dhr: Some(peer),
                rk,
                cks: Some(cks),
                ckr: None,
                ns: 0,
                nr: 0,
                pn: 0,
            },
            store,
        })
    }

    /// [`Session::new_recv`] with a caller-supplied store.
    #[must_use]
    pub fn new_recv_with_store(suite: R, sk: &[u8; 32], own: KeyPair, store: S) -> Self {
        Self {
            suite,
            state: State {
                dhs: own,
                dhr: None,
                rk: RootKey::from_bytes(*sk),
                cks: None,
                ckr: None,
                ns: 0,
                nr: 0,
                pn: 0,
            },
            store,
        }
    }

    /// [`Session::resume`] with a caller-supplied store.
    #[must_use]
    pub fn resume_with_store(suite: R, state: State, store: S) -> Self {
        Self {
            suite,
            state,
            store,
        }
    }

    /// The current committed state.
    ///
    /// Clone it (or [`State::encode`] it) to persist the session; feed the
    /// snapshot to [`Session::resume`] to continue later.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Encrypts and authenticates `plaintext`, additionally authenticating
    /// `additional_data`, and advances the sending chain.
    ///
    /// The state snapshot is persisted before the chain advance is
    /// committed; a persistence failure leaves the session unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncryptionFailed`] or the store's `save_state`
    /// error.
    ///
    /// # Panics
    ///
    /// Panics when the sending chain is uninitialised, i.e. the session was
    /// created with [`Session::new_recv`] and has not yet opened a message.
    /// That is a caller error: the responder cannot address the initiator
    /// before learning its ratchet key.
    pub fn seal(&mut self, plaintext: &[u8], additional_data: &[u8]) -> Result<Message, Error> {
        let cks = self
            .state
            .cks
            .as_ref()
            .expect("sending chain not initialised: the session must open a message first");
        let (next_cks, mk) = self.suite.kdf_ck(cks);
        let header = self
            .suite
            .header(&self.state.dhs, self.state.pn, self.state.ns);
        let bound = self.suite.concat(additional_data, &header);
        let ciphertext = self.suite.seal(&mk, plaintext, &bound)?;

        self.store.save_state(&self.state)?;
        self.state.cks = Some(next_cks);
        self.state.ns += 1;
        Ok(Message { header, ciphertext })
    }

    /// Decrypts and authenticates a message, additionally authenticating
    /// `additional_data`, ratcheting and skipping as the header demands.
    ///
    /// The operation is transactional: mutations are staged on a clone of
    /// the state and committed only after the new snapshot persists, so any
    /// failure leaves the committed state exactly as it was. `rng` feeds
    /// the fresh key pair generated when the header announces a new peer
    /// ratchet key.
    ///
    /// # Errors
    ///
    /// [`Error::DecryptionFailed`] when no plaintext can be produced,
    /// [`Error::InvalidPoint`] for an unusable header key,
    /// [`Error::TooManySkipped`] when caching the intervening message keys
    /// would exceed the skip bound, or a store error.
    pub fn open<G: RngCore + CryptoRng>(
        &mut self,
        message: &Message,
        additional_data: &[u8],
        rng: &mut G,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        let header = &message.header;

        // Fast path: a message whose key was already derived and cached.
        if let Some(mk) = self.store.load_key(header.n, &header.public_key)? {
            let bound = self.suite.concat(additional_data, header);
            let plaintext = self.suite.open(&mk, &message.ciphertext, &bound)?;
            self.store.delete_key(header.n, &header.public_key)?;
            return Ok(plaintext);
        }

        // Stage every mutation on a clone so failures are not persisted.
        let mut tmp = self.state.clone();

        let new_chain = match &tmp.dhr {
            Some(dhr) => !dhr.ct_eq(&header.public_key),
            None => true,
        };
        if new_chain {
            skip(&mut tmp, &self.suite, &mut self.store, header.pn)?;
            dh_ratchet(&mut tmp, &self.suite, &header.public_key, rng)?;
        }
        skip(&mut tmp, &self.suite, &mut self.store, header.n)?;

        let Some(ckr) = tmp.ckr.as_ref() else {
            // The header replays the peer key of a chain that was never
            // ratcheted into; nothing can decrypt it.
            return Err(Error::DecryptionFailed);
        };
        let (next_ckr, mk) = self.suite.kdf_ck(ckr);
        tmp.ckr = Some(next_ckr);
        tmp.nr += 1;

        let bound = self.suite.concat(additional_data, header);
        let plaintext = self.suite.open(&mk, &message.ciphertext, &bound)?;

        self.store.save_state(&tmp)?;
        // Dropping the old state wipes its secrets.
        self.state = tmp;
        Ok(plaintext)
    }
}

/// Derives and caches the message keys for indices `[state.nr, until)` of
/// the current receiving chain. A session without a receiving chain has
/// nothing to skip.
fn skip<R: Suite, S: Store>(
    state: &mut State,
    suite: &R,
    store: &mut S,
    until: u64,
) -> Result<(), Error> {
    if state.ckr.is_none() {
        return Ok(());
    }
    while state.nr < until {
        let ckr = state.ckr.as_ref().expect("receiving chain checked above");
        let (next_ckr, mk) = suite.kdf_ck(ckr);
        let dhr = state
            .dhr
            .as_ref()
            .expect("a receiving chain implies a known peer key");
        store.store_key(state.nr, dhr, mk)?;
        state.ckr = Some(next_ckr);
        state.nr += 1;
    }
    Ok(())
}

/// Ratchets the state onto a newly announced peer public key: the root
/// chain advances twice, once deriving the receiving chain for the peer's
/// new key and once deriving the sending chain for our replacement key
/// pair.
fn dh_ratchet<R: Suite, G: RngCore + CryptoRng>(
    state: &mut State,
    suite: &R,
    public: &PublicKey,
    rng: &mut G,
) -> Result<(), Error> {
    state.pn = state.ns;
    state.ns = 0;
    state.nr = 0;
    state.dhr = Some(public.clone());

    let dh = suite.dh(&state.dhs, public)?;
    let (rk, ckr) = suite.kdf_rk(&state.rk, &dh);
    state.rk = rk;
    state.ckr = Some(ckr);

    state.dhs = suite.generate(rng)?;
    let dh = suite.dh(&state.dhs, public)?;
    let (rk, cks) = suite.kdf_rk(&state.rk, &dh);
    state.rk = rk;
    state.cks = Some(cks);
    Ok(())
}
