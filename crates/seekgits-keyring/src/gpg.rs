//! GPG subprocess provider.
//!
//! All calls are blocking `gpg` invocations with captured stdout and
//! stderr; the filter process has nothing else to do while gpg runs.
//! `--trust-model always` keeps wrapping non-interactive: trust
//! decisions belong to whoever adds a recipient, not to a filter
//! running under git.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use zeroize::Zeroize;

use seekgits_core::{SeekgitsError, SeekgitsResult};
use seekgits_crypto::FileKey;

use crate::Keyring;

/// Environment variable overriding the gpg binary.
pub const GPG_PROGRAM_ENV: &str = "SEEKGITS_GPG";

pub struct GpgKeyring {
    program: String,
}

impl GpgKeyring {
    /// Use the binary named by `SEEKGITS_GPG`, falling back to `gpg`.
    pub fn from_env() -> Self {
        let program = std::env::var(GPG_PROGRAM_ENV).unwrap_or_else(|_| "gpg".to_string());
        Self { program }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run gpg with `args`, optionally feeding `input` on stdin.
    ///
    /// A missing binary surfaces as `ProviderAbsent`; a non-zero exit
    /// is left for the caller to classify from stderr.
    fn run(&self, args: &[&str], input: Option<&[u8]>) -> SeekgitsResult<Output> {
        tracing::debug!(program = %self.program, ?args, "invoking gpg");

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SeekgitsError::ProviderAbsent
            } else {
                SeekgitsError::Io(e)
            }
        })?;

        if let Some(data) = input {
            // stdin was configured as piped above
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(data)?;
            }
            // dropping stdin closes the pipe so gpg sees EOF
        }

        Ok(child.wait_with_output()?)
    }
}

impl Keyring for GpgKeyring {
    fn ensure_available(&self) -> SeekgitsResult<()> {
        let output = self.run(&["--version"], None)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(SeekgitsError::ProviderAbsent)
        }
    }

    fn wrap(&self, key: &FileKey, recipient: &str) -> SeekgitsResult<Vec<u8>> {
        let mut raw = key.to_bytes();
        let result = self.run(
            &[
                "--batch",
                "--yes",
                "--quiet",
                "--trust-model",
                "always",
                "--recipient",
                recipient,
                "--encrypt",
            ],
            Some(&raw),
        );
        raw.zeroize();
        let output = result?;

        if output.status.success() {
            return Ok(output.stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr_names_missing_public_key(&stderr) {
            Err(SeekgitsError::RecipientUnknown(recipient.to_string()))
        } else {
            Err(anyhow::anyhow!("gpg --encrypt failed: {}", stderr.trim()).into())
        }
    }

    fn unwrap(&self, wrapped: &[u8]) -> SeekgitsResult<FileKey> {
        let output = self.run(&["--batch", "--quiet", "--decrypt"], Some(wrapped))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(if stderr_names_missing_private_key(&stderr) {
                SeekgitsError::NoPrivateKey
            } else {
                SeekgitsError::UnwrapFailed(stderr.trim().to_string())
            });
        }

        FileKey::from_slice(&output.stdout).ok_or_else(|| {
            SeekgitsError::UnwrapFailed(format!(
                "expected 64 key bytes, gpg produced {}",
                output.stdout.len()
            ))
        })
    }

    fn default_recipient(&self) -> SeekgitsResult<Option<String>> {
        let output = self.run(&["--batch", "--with-colons", "--list-secret-keys"], None)?;
        if !output.status.success() {
            return Ok(None);
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(first_secret_uid(&listing))
    }

    fn recipient_exists(&self, recipient: &str) -> SeekgitsResult<bool> {
        let output = self.run(&["--batch", "--list-keys", recipient], None)?;
        Ok(output.status.success())
    }
}

/// Pull the first user id out of a `--with-colons` secret-key listing,
/// preferring the bare email when the uid carries one.
fn first_secret_uid(listing: &str) -> Option<String> {
    for line in listing.lines() {
        let mut fields = line.split(':');
        if fields.next() != Some("uid") {
            continue;
        }
        // user id is the tenth colon-separated field
        let Some(uid) = fields.nth(8) else { continue };
        if uid.is_empty() {
            continue;
        }
        return Some(extract_email(uid).unwrap_or_else(|| uid.to_string()));
    }
    None
}

/// `Jane Doe <jane@example.org>` → `jane@example.org`
fn extract_email(uid: &str) -> Option<String> {
    let start = uid.find('<')?;
    let end = uid[start..].find('>')? + start;
    let email = &uid[start + 1..end];
    if email.is_empty() {
        None
    } else {
        Some(email.to_string())
    }
}

fn stderr_names_missing_public_key(stderr: &str) -> bool {
    stderr.contains("No public key")
        || stderr.contains("public key not found")
        || stderr.contains("skipped: No such file")
        || stderr.contains("not a valid userID")
}

fn stderr_names_missing_private_key(stderr: &str) -> bool {
    stderr.contains("No secret key") || stderr.contains("secret key not available")
}
