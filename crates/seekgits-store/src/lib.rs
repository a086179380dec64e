//! seekgits-store: the committed tracked-files manifest
//!
//! `.seekgits.json` maps each tracked path to its recipient-wrapped
//! file keys. The manifest is a committed artifact, so serialization is
//! stable: sorted keys, two-space indentation, trailing newline. A
//! reload-and-save of an unchanged manifest is byte-identical.

pub mod manifest;
pub mod store;

pub use manifest::{Manifest, TrackedFile, MANIFEST_FILE, MANIFEST_VERSION};
pub use store::ConfigStore;
