use std::path::{Path, PathBuf};

use super::types::{AppConfig, TimingProfile};

/// Get the default quantum data directory: ~/.quantum
pub fn get_quantum_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".quantum"))
}

/// Load configuration with the standard lookup order:
/// `~/.quantum/config.toml`, then `./config.toml`, then built-in defaults.
pub fn load_default() -> anyhow::Result<AppConfig> {
    let quantum_config = get_quantum_data_dir().ok().map(|d| d.join("config.toml"));
    let local_config = Path::new("config.toml");

    let cfg = match quantum_config.filter(|p| p.exists()) {
        Some(path) => load_from_path(&path)?,
        None if local_config.exists() => load_from_path(local_config)?,
        None => AppConfig::default(),
    };

    finalize(cfg)
}

/// Load configuration from an explicit file. A missing file is an error.
pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let cfg = load_from_path(path)?;
    finalize(cfg)
}

fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

fn finalize(mut cfg: AppConfig) -> anyhow::Result<AppConfig> {
    apply_env_overrides(&mut cfg)?;
    cfg.timing
        .resolve()
        .validate()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(cfg)
}

// Environment variable overrides (highest priority after CLI flags)
fn apply_env_overrides(cfg: &mut AppConfig) -> anyhow::Result<()> {
    if let Ok(v) = std::env::var("QUANTUM_TIMING_PROFILE") {
        if !v.trim().is_empty() {
            cfg.timing.profile = TimingProfile::parse(&v).ok_or_else(|| {
                anyhow::anyhow!("unknown timing profile in QUANTUM_TIMING_PROFILE: {v}")
            })?;
        }
    }
    if let Ok(v) = std::env::var("QUANTUM_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }
    Ok(())
}
