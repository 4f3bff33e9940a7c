//! Wire protocol: CRC discipline and frame codec.

pub mod crc;
pub mod frame;

// Re-export common types
pub use frame::{Ack, Command, CommandId, DataPacket, Header, Response};
