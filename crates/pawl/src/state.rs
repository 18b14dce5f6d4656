//! Per-session ratchet state.

use zeroize::Zeroizing;

use crate::{ChainKey, Error, KeyPair, PublicKey, RootKey};

/// The mutable state of a ratchet session.
///
/// `Clone` is a deep copy; sessions clone the state before a fallible
/// mutation and swap the copy in only once it is fully committed. Every
/// secret field zeroizes itself on drop, so replacing or discarding a state
/// wipes the superseded keys.
#[derive(Clone)]
pub struct State {
    /// Own current ratchet key pair.
    pub(crate) dhs: KeyPair,
    /// Peer's current ratchet public key; absent on a receiver that has not
    /// yet opened a message.
    pub(crate) dhr: Option<PublicKey>,
    /// Current root key.
    pub(crate) rk: RootKey,
    /// Sending chain key.
    pub(crate) cks: Option<ChainKey>,
    /// Receiving chain key.
    pub(crate) ckr: Option<ChainKey>,
    /// Messages sent in the current sending chain.
    pub(crate) ns: u64,
    /// Messages received in the current receiving chain.
    pub(crate) nr: u64,
    /// Messages sent in the previous sending chain.
    pub(crate) pn: u64,
}

impl State {
    /// Serialises the state for persistence.
    ///
    /// Layout: each byte field (`dhs`, `dhr`, `rk`, `cks`, `ckr`, in that
    /// order) as a big-endian `u32` length prefix followed by the bytes,
    /// with absent fields encoded as length zero; then `ns`, `nr`, and `pn`
    /// as big-endian `u64`s. The returned buffer contains private key
    /// material and is wiped on drop.
    #[must_use]
    pub fn encode(&self) -> Zeroizing<Vec<u8>> {
        let mut buf = Zeroizing::new(Vec::new());
        put_field(&mut buf, self.dhs.as_bytes());
        put_field(
            &mut buf,
            self.dhr.as_ref().map_or(&[][..], |pk| pk.as_bytes()),
        );
        put_field(&mut buf, self.rk.as_bytes());
        put_field(
            &mut buf,
            self.cks.as_ref().map_or(&[][..], |ck| &ck.as_bytes()[..]),
        );
        put_field(
            &mut buf,
            self.ckr.as_ref().map_or(&[][..], |ck| &ck.as_bytes()[..]),
        );
        buf.extend_from_slice(&self.ns.to_be_bytes());
        buf.extend_from_slice(&self.nr.to_be_bytes());
        buf.extend_from_slice(&self.pn.to_be_bytes());
        buf
    }

    /// Deserialises a snapshot produced by [`State::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] on truncated or trailing input, an
    /// empty key pair, or a chain key that is not 32 bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self, Error> {
        let data = &mut data;
        let dhs = take_field(data)?;
        if dhs.is_empty() {
            return Err(Error::InvalidState);
        }
        let dhr = take_field(data)?;
        let rk = take_field(data)?;
        let cks = take_field(data)?;
        let ckr = take_field(data)?;
        let ns = take_u64(data)?;
        let nr = take_u64(data)?;
        let pn = take_u64(data)?;
        if !data.is_empty() {
            return Err(Error::InvalidState);
        }

        Ok(Self {
            dhs: KeyPair::new(dhs.to_vec()),
            dhr: if dhr.is_empty() {
                None
            } else {
                Some(PublicKey::new(dhr.to_vec()))
            },
            rk: RootKey::from_bytes(rk.try_into().map_err(|_| Error::InvalidState)?),
            cks: chain_key_field(cks)?,
            ckr: chain_key_field(ckr)?,
            ns,
            nr,
            pn,
        })
    }
}

fn put_field(buf: &mut Vec<u8>, field: &[u8]) {
    let len = u32::try_from(field.len()).expect("key fields are far below 4 GiB");
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(field);
}

fn take_field<'a>(data: &mut &'a [u8]) -> Result<&'a [u8], Error> {
    if data.len() < 4 {
        return Err(Error::InvalidState);
    }
    let (len, rest) = data.split_at(4);
    let len = u32::from_be_bytes(len.try_into().expect("slice is 4 bytes")) as usize;
    if rest.len() < len {
        return Err(Error::InvalidState);
    }
    let (field, rest) = rest.split_at(len);
    *data = rest;
    Ok(field)
}

fn take_u64(data: &mut &[u8]) -> Result<u64, Error> {
    if data.len() < 8 {
        return Err(Error::InvalidState);
    }
    let (bytes, rest) = data.split_at(8);
    *data = rest;
    Ok(u64::from_be_bytes(bytes.try_into().expect("slice is 8 bytes")))
}

fn chain_key_field(field: &[u8]) -> Result<Option<ChainKey>, Error> {
    if field.is_empty() {
        return Ok(None);
    }
    let bytes: [u8; 32] = field.try_into().map_err(|_| Error::InvalidState)?;
    Ok(Some(ChainKey::from_bytes(bytes)))
}
