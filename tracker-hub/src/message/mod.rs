//! Event channel plumbing
//!
//! ```text
//! viewer ws ──▶ send_to_server() ──▶ client_tx ──▶ MessageHandler ──▶ OrderStore
//!                                                      │
//!             ◀── send_to_client() (status_rejected) ──┤
//!             ◀── publish() ──▶ server_tx (receive_status, every viewer)
//! ```

pub mod bus;
pub mod handler;

pub use bus::{ConnectionId, InboundEvent, MessageBus, TransportConfig};
pub use handler::MessageHandler;
