//! 阶段时间戳
//!
//! 时间戳在 hub 端生成，以人类可读文本存储 (默认 `%I:%M %p`，本地时区)。

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Debug;

/// Default stage time format, e.g. `02:30 PM`
pub const DEFAULT_STAGE_TIME_FORMAT: &str = "%I:%M %p";

/// Source of "now" for stage timestamps
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Check a strftime pattern before it reaches `format()`
pub fn is_valid_format(pattern: &str) -> bool {
    !pattern.is_empty() && StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

/// Pattern to use for stage times; invalid or missing patterns fall back to
/// [`DEFAULT_STAGE_TIME_FORMAT`]
pub fn resolve_format(pattern: Option<&str>) -> String {
    match pattern {
        Some(pattern) if is_valid_format(pattern) => pattern.to_string(),
        Some(pattern) => {
            tracing::warn!(
                "Invalid stage time format {:?}, using {}",
                pattern,
                DEFAULT_STAGE_TIME_FORMAT
            );
            DEFAULT_STAGE_TIME_FORMAT.to_string()
        }
        None => DEFAULT_STAGE_TIME_FORMAT.to_string(),
    }
}

/// Render a stage timestamp; `pattern` must pass [`is_valid_format`]
pub fn format_stage_time(at: &DateTime<Local>, pattern: &str) -> String {
    at.format(pattern).to_string()
}
