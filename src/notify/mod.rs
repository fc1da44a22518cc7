//! Notification fan-out: audience selectors resolved at call time, one
//! record per recipient, per-recipient failure isolation.

pub mod audience;
pub mod fanout;
pub mod types;

pub use audience::AudienceSelector;
pub use fanout::{FanoutFailure, FanoutReport, NotificationFanout};
pub use types::{Notification, NotificationEvent, NotificationKind};
