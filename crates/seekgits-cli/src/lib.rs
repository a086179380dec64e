//! Internals of the `seekgits` binary: the streaming filter engine and
//! the lifecycle commands. Split out as a library so the engine can be
//! exercised in tests with injected streams and keyrings.

pub mod commands;
pub mod filter;
