//! Per-file key material.

use rand::RngCore;
use zeroize::Zeroize;

use crate::{FILE_KEY_LEN, HALF_KEY_LEN};

/// A per-file 64-byte secret, split into an AES half and an HMAC half.
/// Zeroized on drop.
///
/// A file key is generated once when a path starts being tracked and
/// only ever leaves the process wrapped to a recipient. Keys are never
/// derived from one another.
#[derive(Clone)]
pub struct FileKey {
    aes: [u8; HALF_KEY_LEN],
    hmac: [u8; HALF_KEY_LEN],
}

impl FileKey {
    /// Generate a fresh random file key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; FILE_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    pub fn from_bytes(bytes: &[u8; FILE_KEY_LEN]) -> Self {
        let mut aes = [0u8; HALF_KEY_LEN];
        let mut hmac = [0u8; HALF_KEY_LEN];
        aes.copy_from_slice(&bytes[..HALF_KEY_LEN]);
        hmac.copy_from_slice(&bytes[HALF_KEY_LEN..]);
        Self { aes, hmac }
    }

    /// Build a key from raw bytes of unchecked length (e.g. gpg output).
    /// Returns `None` unless the slice is exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let fixed: &[u8; FILE_KEY_LEN] = bytes.try_into().ok()?;
        Some(Self::from_bytes(fixed))
    }

    /// The AES-256 half (bytes 0..31 of the key).
    pub fn aes_key(&self) -> &[u8; HALF_KEY_LEN] {
        &self.aes
    }

    /// The HMAC half (bytes 32..63 of the key).
    pub fn hmac_key(&self) -> &[u8; HALF_KEY_LEN] {
        &self.hmac
    }

    /// Reassemble the full 64 bytes, e.g. for streaming to the wrapper.
    pub fn to_bytes(&self) -> [u8; FILE_KEY_LEN] {
        let mut bytes = [0u8; FILE_KEY_LEN];
        bytes[..HALF_KEY_LEN].copy_from_slice(&self.aes);
        bytes[HALF_KEY_LEN..].copy_from_slice(&self.hmac);
        bytes
    }
}

impl Drop for FileKey {
    fn drop(&mut self) {
        self.aes.zeroize();
        self.hmac.zeroize();
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
