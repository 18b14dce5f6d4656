//! Message header codec and the associated-data binding.

use crate::{Error, PublicKey};

/// Maximum encoded length of the signed varint prefix.
const MAX_VARINT_LEN: usize = 10;

/// The per-message ratchet header.
///
/// Travels in the clear next to the ciphertext and is authenticated by
/// being folded into the AEAD associated data via [`concat`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// The sender's current ratchet public key.
    pub public_key: PublicKey,
    /// Number of messages in the sender's previous sending chain.
    pub pn: u64,
    /// This message's index within the current sending chain.
    pub n: u64,
}

impl Header {
    /// Serialises the header: `pn` and `n` as big-endian `u64`s followed by
    /// the public key bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let public_key = self.public_key.as_bytes();
        let mut buf = Vec::with_capacity(16 + public_key.len());
        buf.extend_from_slice(&self.pn.to_be_bytes());
        buf.extend_from_slice(&self.n.to_be_bytes());
        buf.extend_from_slice(public_key);
        buf
    }

    /// Deserialises a header.
    ///
    /// The trailing bytes are taken verbatim as the public key; its length
    /// is validated by the suite when the key is first used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] on fewer than 16 bytes of input.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 16 {
            return Err(Error::InvalidHeader);
        }
        let pn = u64::from_be_bytes(data[0..8].try_into().expect("slice is 8 bytes"));
        let n = u64::from_be_bytes(data[8..16].try_into().expect("slice is 8 bytes"));
        Ok(Self {
            public_key: PublicKey::new(data[16..].to_vec()),
            pn,
            n,
        })
    }
}

/// Builds the associated-data byte string bound into the AEAD:
/// a signed varint of the caller data's length, the caller data, then the
/// encoded header.
///
/// The length prefix keeps the caller data and header unambiguously
/// separable. The varint is the zig-zag signed base-128 variant (at most
/// [`MAX_VARINT_LEN`] bytes); peers must use the same variant to
/// interoperate.
#[must_use]
pub fn concat(additional_data: &[u8], header: &Header) -> Vec<u8> {
    let public_key = header.public_key.as_bytes();
    let mut buf =
        Vec::with_capacity(MAX_VARINT_LEN + additional_data.len() + 16 + public_key.len());
    put_varint(&mut buf, additional_data.len() as i64);
    buf.extend_from_slice(additional_data);
    buf.extend_from_slice(&header.encode());
    buf
}

/// Appends a zig-zag signed varint: non-negative `x` maps to `2x`,
/// negative `x` to `2|x| - 1`, then base-128 with continuation bits.
fn put_varint(buf: &mut Vec<u8>, x: i64) {
    let mut ux = (x as u64) << 1;
    if x < 0 {
        ux = !ux;
    }
    put_uvarint(buf, ux);
}

fn put_uvarint(buf: &mut Vec<u8>, mut x: u64) {
    while x >= 0x80 {
        buf.push(x as u8 | 0x80);
        x >>= 7;
    }
    buf.push(x as u8);
}
