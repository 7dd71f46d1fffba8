use thiserror::Error;

use super::controller::ControllerError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("model failed to load: {0}")]
    LoadFailed(String),
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
