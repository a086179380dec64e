//! seekgits-core: shared error and path types
//!
//! Everything here is consumed by the other seekgits crates; keep this
//! crate dependency-light.

pub mod error;
pub mod paths;

pub use error::{SeekgitsError, SeekgitsResult};
