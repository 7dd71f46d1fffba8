#[allow(clippy::module_inception)]
pub mod error;
pub mod controller;

pub use controller::{ControllerError, RejectReason};
pub use error::CliError;
