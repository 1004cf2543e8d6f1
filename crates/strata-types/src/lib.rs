//! Foundation types for strata.
//!
//! This crate provides the content-addressed identifier used throughout the
//! strata system. Every other strata crate depends on `strata-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — Content-addressed identifier (BLAKE3 hash, hex-encoded)
//! - [`TypeError`] — Parse/validation failures for foundation types

pub mod digest;
pub mod error;

pub use digest::Digest;
pub use error::TypeError;
