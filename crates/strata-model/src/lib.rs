//! External model codec abstraction.
//!
//! Model files are opaque to the version store. Turning one into its three
//! constituent artifacts — architecture descriptor, metadata descriptor, raw
//! tensor bytes — and back again is the job of an external tool, reached
//! through the [`ModelCodec`] trait:
//!
//! - [`CommandCodec`] — runs a configurable out-of-process command with a
//!   timeout, capturing stdout/stderr for diagnostics. The command line is a
//!   template; nothing about the tool is hardcoded.
//! - [`FramedCodec`] — an in-process codec for tests and embedding that
//!   treats the model file as a simple length-prefixed container.
//!
//! The contract either implementation must satisfy: `rebuild` applied to the
//! artifacts `extract` produced reproduces the original model file
//! byte-for-byte.

pub mod codec;
pub mod command;
pub mod error;
pub mod framed;

pub use codec::{Extracted, ModelCodec};
pub use command::{CommandCodec, CommandCodecConfig};
pub use error::{ModelError, ModelResult};
pub use framed::FramedCodec;
