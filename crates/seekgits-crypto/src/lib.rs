//! seekgits-crypto: deterministic file encryption
//!
//! Construction: AES-256-CTR with an HMAC-SHA256-derived nonce.
//!
//! ```text
//! FileKey (64 bytes, random, one per tracked path)
//!   ├── aes_key  (bytes 0..31)  — AES-256-CTR keystream
//!   └── hmac_key (bytes 32..63) — nonce = HMAC-SHA256(hmac_key, plaintext)
//! ```
//!
//! The nonce is a function of the plaintext, so the same plaintext under
//! the same key always produces the same frame. Git's change detection
//! then works on ciphertext exactly as it does on plaintext. There is
//! deliberately no authentication tag: git is content-addressed, so a
//! tampered frame changes its object hash and shows up in review.

pub mod cipher;
pub mod keys;

pub use cipher::{decrypt, encrypt, is_encrypted};
pub use keys::FileKey;

/// Magic marker prefixing every encrypted frame (`\0SEEKGITS\0`).
pub const MAGIC: [u8; 10] = [
    0x00, 0x53, 0x45, 0x45, 0x4B, 0x47, 0x49, 0x54, 0x53, 0x00,
];

/// Size of a file key in bytes: a 32-byte AES key plus a 32-byte HMAC key.
pub const FILE_KEY_LEN: usize = 64;

/// Size of each half of the file key.
pub const HALF_KEY_LEN: usize = 32;

/// Size of the stored nonce (a full HMAC-SHA256 output).
pub const NONCE_LEN: usize = 32;

/// Frame header size: magic marker plus nonce.
pub const HEADER_LEN: usize = MAGIC.len() + NONCE_LEN;
