//! Project lifecycle: guarded stage transitions driven by brief approval,
//! modification requests, and delivery validation.

pub mod engine;
pub mod state_machine;
pub mod types;

pub use engine::LifecycleEngine;
pub use state_machine::LifecycleEvent;
pub use types::{Brief, BriefStatus, Project, Stage};
