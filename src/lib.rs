// Atelier - Workflow & Notification Engine
// This exposes the core components for testing and integration

pub mod access;
pub mod lifecycle;
pub mod notify;
pub mod campaign;
pub mod store;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod observability;

// Re-export key types for easy access
pub use access::{Actor, Role};
pub use lifecycle::{Brief, BriefStatus, LifecycleEngine, LifecycleEvent, Project, Stage};
pub use notify::{
    AudienceSelector, FanoutFailure, FanoutReport, Notification, NotificationEvent,
    NotificationFanout, NotificationKind,
};
pub use campaign::{
    cancel_pair, BatchDispatcher, CampaignRunner, CampaignSelector, CancelHandle, CancelToken,
    ContactRecord, DispatchReport, DispatcherConfig, ItemOutcome, ProspectSender, ProspectStatus,
    SendError, SendReceipt,
};
pub use store::{BriefStore, ContactStore, MemoryStore, NotificationStore, ProjectStore};
pub use config::{AtelierConfig, CampaignConfig, ObservabilityConfig};
pub use error::EngineError;
pub use telemetry::{
    create_operation_span, generate_correlation_id, init_telemetry, shutdown_telemetry,
};
pub use observability::{engine_metrics, EngineMetrics, EngineStats, OperationTimer};
