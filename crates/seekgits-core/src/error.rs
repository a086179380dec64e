use thiserror::Error;

pub type SeekgitsResult<T> = Result<T, SeekgitsError>;

#[derive(Debug, Error)]
pub enum SeekgitsError {
    #[error("repository is not set up for seekgits (run `seekgits init`)")]
    NotInitialized,

    #[error("manifest is corrupt: {0}")]
    CorruptManifest(String),

    #[error("`{0}` is already tracked")]
    AlreadyTracked(String),

    #[error("`{0}` is not tracked")]
    NotTracked(String),

    #[error("`{path}` is already shared with `{recipient}`")]
    RecipientDuplicate { path: String, recipient: String },

    #[error("no private identity found in the keyring")]
    NoIdentity,

    #[error("recipient `{0}` has no usable public key")]
    RecipientUnknown(String),

    #[error("no private key available to unwrap the file key")]
    NoPrivateKey,

    #[error("unwrapping the file key failed: {0}")]
    UnwrapFailed(String),

    #[error("cannot unwrap a file key for `{path}` (wrapped for: {})", .recipients.join(", "))]
    NoAccess {
        path: String,
        recipients: Vec<String>,
    },

    #[error("input is not a seekgits frame (magic marker missing)")]
    NotEncrypted,

    #[error("gpg is not installed or not on PATH")]
    ProviderAbsent,

    #[error("not inside a git repository")]
    NotARepository,

    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("git {command} failed: {stderr}")]
    GitCommand { command: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
