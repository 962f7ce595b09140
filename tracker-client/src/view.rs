//! Presentation model
//!
//! Plain data describing what a viewer shows. Rendering (markup, styling,
//! animation) is up to the embedding front end.

use serde::Serialize;
use shared::{Stage, StatusIntent, ViewRole};

pub const ADMIN_TITLE: &str = "🛠️ Admin Control Panel";
pub const CUSTOMER_TITLE: &str = "🚚 Live Order Tracking";
pub const PLACE_ORDER_LABEL: &str = "Place My Order Now";
pub const ADMIN_CONTROLS_HEADING: &str = "Admin Controls";
pub const RESET_LABEL: &str = "🔄 Reset Order";

/// Progress bar between step `i` and `i + 1`; progress is binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorFill {
    Empty,
    Full,
}

/// One step of the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub stage: Stage,
    pub label: &'static str,
    pub icon: &'static str,
    pub is_active: bool,
    pub is_current: bool,
    /// Recorded time, or `--:--`
    pub time_text: String,
    pub has_time: bool,
    /// `None` for the last step
    pub connector: Option<ConnectorFill>,
}

/// Admin button for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminControl {
    pub label: &'static str,
    /// Control matching the current status
    pub highlighted: bool,
    #[serde(skip)]
    pub intent: StatusIntent,
}

/// What the viewer shows below the title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Screen {
    /// Customer before ordering
    PlaceOrder {
        banner: String,
        action_label: &'static str,
    },
    /// Customer after ordering
    Tracker { steps: Vec<StepView> },
    /// Admin, always
    AdminPanel {
        steps: Vec<StepView>,
        heading: &'static str,
        controls: Vec<AdminControl>,
        reset_label: &'static str,
    },
}

impl Screen {
    pub fn steps(&self) -> &[StepView] {
        match self {
            Screen::PlaceOrder { .. } => &[],
            Screen::Tracker { steps } | Screen::AdminPanel { steps, .. } => steps,
        }
    }

    pub fn is_place_order(&self) -> bool {
        matches!(self, Screen::PlaceOrder { .. })
    }
}

/// Complete derived view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub role: ViewRole,
    pub title: &'static str,
    pub screen: Screen,
}

impl ViewModel {
    pub fn title_for(role: ViewRole) -> &'static str {
        if role.is_admin() {
            ADMIN_TITLE
        } else {
            CUSTOMER_TITLE
        }
    }
}
