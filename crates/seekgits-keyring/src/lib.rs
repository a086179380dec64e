//! seekgits-keyring: wrapping file keys to recipients
//!
//! seekgits never generates or stores asymmetric keypairs. Wrapping a
//! file key to a recipient is delegated to an external provider (gpg)
//! that already holds the user's identities. The provider is driven as
//! a subprocess with raw bytes on stdin/stdout; seekgits is agnostic to
//! the blob format it produces.

pub mod gpg;

pub use gpg::GpgKeyring;

use seekgits_core::SeekgitsResult;
use seekgits_crypto::FileKey;

/// The asymmetric provider seam.
///
/// The production implementation is [`GpgKeyring`]; tests substitute an
/// in-memory keyring so the store and filter engine can run without a
/// gpg installation.
pub trait Keyring {
    /// Fail with `ProviderAbsent` when the provider is not installed.
    fn ensure_available(&self) -> SeekgitsResult<()>;

    /// Encrypt the 64 raw key bytes to `recipient`.
    fn wrap(&self, key: &FileKey, recipient: &str) -> SeekgitsResult<Vec<u8>>;

    /// Recover a file key from a wrapped blob using whatever private
    /// material the host environment exposes.
    fn unwrap(&self, wrapped: &[u8]) -> SeekgitsResult<FileKey>;

    /// The first private identity available, if any.
    fn default_recipient(&self) -> SeekgitsResult<Option<String>>;

    /// Best-effort check that `recipient` has usable public material.
    fn recipient_exists(&self, recipient: &str) -> SeekgitsResult<bool>;
}
