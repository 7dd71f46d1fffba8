//! quantum-core: the simulated model lifecycle and response streaming that
//! back the Quantum console.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod render;
pub mod request;
pub mod session;
pub mod timer;
pub mod util;
