//! Core type definitions for stockline.
//!
//! This crate defines the types every other stockline crate shares:
//! - [`Item`], the domain object persisted into single-line record fields
//! - [`HostVersion`], the ordered version of the running host platform
//! - [`HostPlatform`], the host's native and legacy encode/decode primitives
//!
//! The host platform is an external collaborator. The core only ever talks to
//! it through [`HostPlatform`] and converts every [`HostError`] it returns into
//! its own vocabulary at the call boundary.

mod host;
mod item;
mod version;

pub use host::{HostError, HostPlatform, HostResult, Tree};
pub use item::Item;
pub use version::HostVersion;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid host version: {0}")]
    InvalidVersion(String),
}
