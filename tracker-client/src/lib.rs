//! Tracker Client - viewer side of the order status sync protocol
//!
//! - [`HttpClient`] pulls the initial snapshot (`GET /order/{id}`)
//! - [`message`] owns the event channel (WebSocket or in-memory)
//! - [`ClientProjector`] derives the view from the latest snapshot
//! - [`ViewerSession`] ties them together for one mounted viewer
//! - [`role`] resolves admin / customer presentation from a signed credential

pub mod config;
pub mod error;
pub mod http;
pub mod message;
pub mod projector;
pub mod role;
pub mod session;
pub mod view;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use message::{ChannelConnector, ChannelHandle, MemoryConnector, WsConnector};
pub use projector::ClientProjector;
pub use role::{JwtRoleVerifier, RoleVerifier, resolve_from_config, resolve_role};
pub use session::{SessionControls, SnapshotSource, ViewerSession};
pub use view::{ConnectorFill, Screen, StepView, ViewModel};

// Re-export shared types for convenience
pub use shared::{ChannelEvent, OrderSnapshot, Stage, StatusIntent, ViewRole, ViewSelector};
