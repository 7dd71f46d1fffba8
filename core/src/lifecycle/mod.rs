//! Simulated model lifecycle: `unloaded -> loading -> ready`, with a
//! terminal `error` branch reachable only through fault injection.

mod controller;
mod increments;
mod state;

pub use controller::{LifecycleController, LifecycleGate, LoaderTiming};
pub use increments::{FixedIncrements, IncrementSource, UniformIncrements};
pub use state::{
    LifecycleSnapshot, LifecycleState, LifecycleStatus, ProgressStep, PROGRESS_COMPLETE,
};
