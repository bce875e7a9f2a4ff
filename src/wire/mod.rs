//! Wire-level protocol handling: line framing, handshake, message decoding.

pub mod framer;
pub mod handshake;
pub mod message;

pub use framer::LineFramer;
pub use handshake::{HIGH_LEVEL_PROTOCOL, HostGreeting, LOW_LEVEL_PROTOCOL};
pub use message::{AcmiMessage, GLOBAL_ID, UNKNOWN_ID};
