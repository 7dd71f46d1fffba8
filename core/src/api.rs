//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `quantum_core::api` instead of reaching into internal modules.

pub use crate::backend::ResponseBackend;
pub use crate::config::{
    load_default, load_from, AppConfig, BackendConfig, LoggingConfig, ResolvedTiming,
    TemplateBackendConfig, TimingConfig, TimingProfile, TuiConfig,
};
pub use crate::error::{CliError, ControllerError, RejectReason};
pub use crate::events::{EventBus, StateEvent};
pub use crate::lifecycle::{
    FixedIncrements, IncrementSource, LifecycleController, LifecycleGate, LifecycleSnapshot,
    LifecycleStatus, LoaderTiming, UniformIncrements,
};
pub use crate::render::SnapshotRenderer;
pub use crate::request::{
    AlwaysReady, ReadinessGate, RequestProcessor, RequestSnapshot, RequestStatus, StreamTiming,
};
pub use crate::session::Session;
