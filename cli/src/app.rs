//! CLI assembly: merge command-line overrides into the config, build the
//! backend, and dispatch between the TUI and headless flows.
use std::io;

use quantum_core::api::{AppConfig, CliError};
use quantum_plugins::factory;

use crate::commands::cli::Args;
use crate::flow::{headless, tui, FaultTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Tui,
    Headless,
}

/// Apply timing flags and re-validate the result.
pub fn apply_cli_overrides(cfg: &mut AppConfig, args: &Args) -> Result<(), CliError> {
    args.apply_timing_overrides(&mut cfg.timing);
    cfg.timing
        .resolve()
        .validate()
        .map_err(CliError::Config)
}

/// The TUI runs only when no one-shot prompt was given, it is enabled in both
/// config and flags, and the terminal can host it.
pub fn select_mode(args: &Args, cfg: &AppConfig) -> RunMode {
    if args.prompt.is_some() || args.no_tui || !cfg.tui.enabled {
        return RunMode::Headless;
    }
    match crate::tui::check_tui_support() {
        Ok(()) => RunMode::Tui,
        Err(reason) => {
            tracing::debug!("TUI disabled: {}", reason);
            RunMode::Headless
        }
    }
}

#[tracing::instrument(name = "cli.run_app", skip(args, cfg))]
pub async fn run_app(args: Args, cfg: AppConfig, mode: RunMode) -> Result<i32, CliError> {
    let timing = cfg.timing.resolve();
    let backend = factory::build_backend(&cfg);
    tracing::debug!(
        profile = cfg.timing.profile.as_str(),
        backend = backend.name(),
        "console initialized"
    );

    match mode {
        RunMode::Tui => {
            tui::run_tui_flow(&cfg.tui, &timing, backend, args.inject_load_fault).await
        }
        RunMode::Headless => {
            let show_progress = atty::is(atty::Stream::Stderr);
            let renderer = factory::build_renderer(
                args.format.as_str(),
                Box::new(io::stdout()),
                show_progress,
            )?;
            headless::run_headless_flow(
                &timing,
                backend,
                args.prompt.as_deref(),
                renderer,
                FaultTimer::new(args.inject_load_fault),
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_prompt_forces_headless() {
        let args = Args::parse_from(["quantum", "--prompt", "hello"]);
        assert_eq!(select_mode(&args, &AppConfig::default()), RunMode::Headless);
    }

    #[test]
    fn test_tui_disabled_in_config() {
        let args = Args::parse_from(["quantum"]);
        let cfg = AppConfig {
            tui: quantum_core::api::TuiConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(select_mode(&args, &cfg), RunMode::Headless);
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let args = Args::parse_from(["quantum", "--reveal-chunk-chars", "0"]);
        let mut cfg = AppConfig::default();
        let err = apply_cli_overrides(&mut cfg, &args).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
