//! Line source implementations.

pub mod memory;
pub mod socket;

pub use memory::MemorySource;
pub use socket::SocketSource;
