//! Deterministic encrypt/decrypt and the on-store frame format.
//!
//! Frame layout:
//! ```text
//! [10 bytes: magic \0SEEKGITS\0][32 bytes: HMAC-SHA256 nonce][N bytes: AES-256-CTR ciphertext]
//! ```
//!
//! The first 16 bytes of the nonce seed the CTR counter block; the full
//! 32 bytes are stored verbatim so the frame is self-describing.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes256;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use seekgits_core::{SeekgitsError, SeekgitsResult};

use crate::keys::FileKey;
use crate::{HEADER_LEN, MAGIC, NONCE_LEN};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// True iff `data` carries the seekgits magic marker.
///
/// Anything at least 10 bytes long starting with the marker is treated
/// as already encrypted; this is the double-encrypt guard.
pub fn is_encrypted(data: &[u8]) -> bool {
    data.len() >= MAGIC.len() && data[..MAGIC.len()] == MAGIC
}

/// Encrypt `plaintext` into a frame.
///
/// Deterministic: the nonce is HMAC-SHA256 of the plaintext under the
/// key's HMAC half, so identical plaintext yields an identical frame.
pub fn encrypt(key: &FileKey, plaintext: &[u8]) -> Vec<u8> {
    let nonce = derive_nonce(key, plaintext);

    let mut frame = Vec::with_capacity(HEADER_LEN + plaintext.len());
    frame.extend_from_slice(&MAGIC);
    frame.extend_from_slice(&nonce);
    frame.extend_from_slice(plaintext);
    apply_keystream(key, &nonce, &mut frame[HEADER_LEN..]);
    frame
}

/// Decrypt a frame back to plaintext.
///
/// Fails with [`SeekgitsError::NotEncrypted`] when the magic marker is
/// missing or the frame is too short to hold a nonce. A wrong AES key
/// yields garbage rather than an error: integrity is delegated to
/// git's content addressing.
pub fn decrypt(key: &FileKey, frame: &[u8]) -> SeekgitsResult<Vec<u8>> {
    if !is_encrypted(frame) || frame.len() < HEADER_LEN {
        return Err(SeekgitsError::NotEncrypted);
    }

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&frame[MAGIC.len()..HEADER_LEN]);

    let mut plaintext = frame[HEADER_LEN..].to_vec();
    apply_keystream(key, &nonce, &mut plaintext);
    Ok(plaintext)
}

/// nonce = HMAC-SHA256(hmac_key, plaintext), over the whole buffer.
fn derive_nonce(key: &FileKey, plaintext: &[u8]) -> [u8; NONCE_LEN] {
    let mut mac = HmacSha256::new_from_slice(key.hmac_key())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(plaintext);
    mac.finalize().into_bytes().into()
}

/// XOR `buf` with the AES-256-CTR keystream seeded by `nonce[0..16]`.
fn apply_keystream(key: &FileKey, nonce: &[u8; NONCE_LEN], buf: &mut [u8]) {
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&nonce[..16]);
    let mut cipher = Aes256Ctr::new(key.aes_key().into(), &iv.into());
    cipher.apply_keystream(buf);
}
