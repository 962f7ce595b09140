//! Viewer roles
//!
//! Two inputs decide which presentation a viewer gets:
//!
//! - [`ViewSelector`]: launch-time hint (`role=admin` / `role=user`). Carries
//!   no authentication and is never trusted to grant the admin view.
//! - [`RoleClaims`]: claims of a credential issued and signed by the backend.
//!   Only a verified claim can grant [`ViewRole::Admin`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation a viewer is allowed to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewRole {
    Admin,
    #[default]
    Customer,
}

impl ViewRole {
    pub fn is_admin(self) -> bool {
        matches!(self, ViewRole::Admin)
    }

    /// Narrow a verified role with the launch hint
    ///
    /// The hint can downgrade an admin to the customer view, never the
    /// other way round.
    pub fn narrowed_by(self, hint: ViewSelector) -> ViewRole {
        match (self, hint) {
            (ViewRole::Admin, ViewSelector::Admin) => ViewRole::Admin,
            _ => ViewRole::Customer,
        }
    }
}

impl fmt::Display for ViewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewRole::Admin => write!(f, "admin"),
            ViewRole::Customer => write!(f, "customer"),
        }
    }
}

/// Unauthenticated launch-time view selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewSelector {
    Admin,
    #[default]
    User,
}

impl ViewSelector {
    /// Parse the launch parameter; anything but `admin` selects the user view
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("admin") => ViewSelector::Admin,
            _ => ViewSelector::User,
        }
    }
}

/// Claims carried by a role credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaims {
    /// Subject (viewer / operator id)
    pub sub: String,
    pub role: ViewRole,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    pub iss: String,
}
