//! Order state
//!
//! In-memory authoritative state for every tracked order. All mutation goes
//! through [`OrderStore::apply_update`], called from the message handler.

pub mod store;

pub use store::OrderStore;
