//! quantum-cli library, exposing modules for unit tests

pub mod app;
pub mod commands;
pub mod flow;
pub mod tui;
