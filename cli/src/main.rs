use clap::Parser;
use quantum_cli::app::{self, RunMode};
use quantum_cli::commands::cli;
use quantum_core::api::CliError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let loaded = match args.config.as_deref() {
        Some(path) => quantum_core::config::load_from(path),
        None => quantum_core::config::load_default(),
    };
    let mut cfg = loaded.map_err(|e| CliError::Config(e.to_string()))?;
    app::apply_cli_overrides(&mut cfg, &args)?;

    let mode = app::select_mode(&args, &cfg);
    init_tracing(&cfg.logging, mode == RunMode::Tui).map_err(CliError::Logging)?;
    tracing::debug!(?mode, "run mode selected");

    app::run_app(args, cfg, mode).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: terminal / IO error
    // 30: model failed to load
    // 40: request rejected
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Terminal(_) => 20,
        CliError::Logging(_) => 20,
        CliError::Io(_) => 20,
        CliError::LoadFailed(_) => 30,
        CliError::Controller(ce) if ce.is_rejection() => 40,
        CliError::Controller(_) => 50,
        CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(
    logging: &quantum_core::config::LoggingConfig,
    tui_active: bool,
) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    // The TUI owns the terminal; stderr output would corrupt the screen.
    let console = logging.console && !tui_active;

    let mut maybe_writer = None;
    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("quantum"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("quantum.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !console && maybe_writer.is_none() {
        return Ok(());
    }

    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
