//! Event channel handles
//!
//! A viewer owns exactly one [`ChannelHandle`] for its lifetime: opened on
//! mount through a [`ChannelConnector`], closed on unmount (or drop).
//!
//! - [`WsConnector`] - WebSocket to a hub's `/ws` endpoint
//! - [`MemoryConnector`] - in-process pair, for tests and embedding

mod handle;
mod memory;
mod ws;

pub use handle::{ChannelConnector, ChannelHandle, ChannelSender};
pub use memory::{MemoryConnector, MemoryPeer};
pub use ws::WsConnector;

/// Default buffer size for each direction of a channel
pub const CHANNEL_BUFFER: usize = 256;
