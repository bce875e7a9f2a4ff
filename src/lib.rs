//! Modern, async Rust client for Tacview ACMI real-time telemetry.
//!
//! Tacwire connects to an ACMI telemetry host over TCP, performs the text
//! handshake, and reconstructs a live model of the simulated objects from
//! the newline-delimited update feed.
//!
//! # Features
//!
//! - **Live streaming**: background transport task with cooperative
//!   cancellation and surfaced transport errors
//! - **Best-effort decoding**: unknown fields and malformed values never
//!   abort a session
//! - **Single-writer model**: raw lines cross threads through one queue;
//!   mission state is mutated by exactly one consumer
//! - **Typed events**: one broadcast channel of categorized mission events
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tacwire::{AcmiMission, ClientConfig, TacviewClient, drive_mission};
//!
//! #[tokio::main]
//! async fn main() -> tacwire::Result<()> {
//!     let config = ClientConfig::new("localhost", "Viewer").with_purge_on_frame(true);
//!     let client = TacviewClient::connect(config).await?;
//!
//!     let mut mission = AcmiMission::new();
//!     let cancel = tokio_util::sync::CancellationToken::new();
//!     drive_mission(client.lines(), &mut mission, cancel).await;
//!
//!     for (id, object) in mission.objects() {
//!         println!("{id:x}: {} at {}m", object.name, object.altitude);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod mission;
pub mod object;
pub mod queue;
pub mod wire;

// Streaming transport architecture
pub mod client;
pub mod driver;
pub mod source;
pub mod sources;

// Core exports
pub use error::{AcmiError, Result};
pub use mission::{AcmiMission, ApplyReport, EventKind, MissionEvent};
pub use object::{CoordinateUpdate, FieldOutcome, FieldStatus, SimObject};
pub use queue::LineQueue;
pub use wire::{AcmiMessage, GLOBAL_ID, HostGreeting, UNKNOWN_ID};

// Transport exports
pub use client::{ClientConfig, DEFAULT_TELEMETRY_PORT, TacviewClient};
pub use driver::{ClientStatus, Driver, DriverChannels, drive_mission};
pub use source::LineSource;
pub use sources::{MemorySource, SocketSource};
