//! Client configuration

use shared::{DEFAULT_ORDER_ID, ViewSelector};

/// Default storefront banner on the place-order screen
pub const DEFAULT_STOREFRONT: &str = "Pawan's Kitchen 🍕";

/// Viewer configuration for connecting to a tracker hub
///
/// | Variable | Default |
/// |----------|---------|
/// | TRACKER_URL | http://localhost:3000 |
/// | TRACKER_ORDER_ID | 123 |
/// | TRACKER_VIEW | user |
/// | TRACKER_ROLE_TOKEN | - |
/// | TRACKER_ROLE_SECRET | - |
/// | TRACKER_STOREFRONT | Pawan's Kitchen 🍕 |
/// | TRACKER_TIMEOUT | 30 |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hub base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Order this viewer tracks
    pub order_id: String,

    /// Snapshot request timeout in seconds
    pub timeout: u64,

    /// Launch-time view selector; can only narrow the verified role
    pub view_hint: ViewSelector,

    /// Signed role credential
    pub role_token: Option<String>,

    /// HS256 secret used to verify `role_token`
    pub role_secret: Option<String>,

    /// Banner shown above the place-order action
    pub storefront: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            order_id: DEFAULT_ORDER_ID.to_string(),
            timeout: 30,
            view_hint: ViewSelector::User,
            role_token: None,
            role_secret: None,
            storefront: DEFAULT_STOREFRONT.to_string(),
        }
    }

    /// Load from `TRACKER_*` environment variables
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("TRACKER_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let mut config = Self::new(base_url);

        if let Ok(order_id) = std::env::var("TRACKER_ORDER_ID")
            && !order_id.trim().is_empty()
        {
            config.order_id = order_id;
        }
        config.view_hint = ViewSelector::from_param(std::env::var("TRACKER_VIEW").ok().as_deref());
        config.role_token = std::env::var("TRACKER_ROLE_TOKEN").ok().filter(|t| !t.is_empty());
        config.role_secret = std::env::var("TRACKER_ROLE_SECRET").ok().filter(|s| !s.is_empty());
        if let Ok(storefront) = std::env::var("TRACKER_STOREFRONT") {
            config.storefront = storefront;
        }
        config.timeout = std::env::var("TRACKER_TIMEOUT")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(config.timeout);
        config
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = order_id.into();
        self
    }

    pub fn with_view_hint(mut self, hint: ViewSelector) -> Self {
        self.view_hint = hint;
        self
    }

    /// Set the role credential and the secret that verifies it
    pub fn with_role_credential(
        mut self,
        token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.role_token = Some(token.into());
        self.role_secret = Some(secret.into());
        self
    }

    pub fn with_storefront(mut self, storefront: impl Into<String>) -> Self {
        self.storefront = storefront.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Event channel URL: `http(s)://host` becomes `ws(s)://host/ws`
    pub fn ws_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{ws_base}/ws")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.order_id, "123");
        assert_eq!(config.view_hint, ViewSelector::User);
        assert!(config.role_token.is_none());
    }

    #[test]
    fn test_ws_url() {
        assert_eq!(
            ClientConfig::new("http://localhost:3000/").ws_url(),
            "ws://localhost:3000/ws"
        );
        assert_eq!(
            ClientConfig::new("https://tracker.example.com").ws_url(),
            "wss://tracker.example.com/ws"
        );
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://hub")
            .with_order_id("42")
            .with_view_hint(ViewSelector::Admin)
            .with_role_credential("token", "secret")
            .with_timeout(5);
        assert_eq!(config.order_id, "42");
        assert_eq!(config.view_hint, ViewSelector::Admin);
        assert_eq!(config.role_secret.as_deref(), Some("secret"));
        assert_eq!(config.timeout, 5);
    }
}
