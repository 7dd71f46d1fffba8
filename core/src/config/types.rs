use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr. Ignored while the TUI owns the terminal.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "quantum_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Named timing presets. Explicit values in `[timing]` win over the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingProfile {
    /// Stock pacing: 800ms warm-up, 400ms progress ticks,
    /// 1s thinking pause, 30ms per revealed character.
    #[default]
    Reference,
    /// Same shape, roughly five times quicker.
    Fast,
    /// Minimal delays, for scripted runs.
    Instant,
}

impl TimingProfile {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "default" => Some(Self::Reference),
            "fast" => Some(Self::Fast),
            "instant" => Some(Self::Instant),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Fast => "fast",
            Self::Instant => "instant",
        }
    }

    /// The full timing table this profile stands for.
    pub fn timings(self) -> ResolvedTiming {
        match self {
            Self::Reference => ResolvedTiming {
                load_start_delay_ms: 800,
                load_tick_ms: 400,
                max_progress_increment: 15.0,
                stream_start_delay_ms: 1_000,
                reveal_tick_ms: 30,
                reveal_chunk_chars: 1,
            },
            Self::Fast => ResolvedTiming {
                load_start_delay_ms: 150,
                load_tick_ms: 80,
                max_progress_increment: 15.0,
                stream_start_delay_ms: 200,
                reveal_tick_ms: 6,
                reveal_chunk_chars: 1,
            },
            Self::Instant => ResolvedTiming {
                load_start_delay_ms: 1,
                load_tick_ms: 1,
                max_progress_increment: 50.0,
                stream_start_delay_ms: 1,
                reveal_tick_ms: 1,
                reveal_chunk_chars: 16,
            },
        }
    }
}

/// `[timing]` table as written in config.toml. Every field is optional so a
/// profile can supply the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default)]
    pub profile: TimingProfile,

    /// Delay between `start()` and the first loading state.
    #[serde(default)]
    pub load_start_delay_ms: Option<u64>,

    /// Interval between loading progress ticks.
    #[serde(default)]
    pub load_tick_ms: Option<u64>,

    /// Upper bound (in percentage points) of one progress increment.
    #[serde(default)]
    pub max_progress_increment: Option<f64>,

    /// Delay between an accepted submission and the first revealed unit.
    #[serde(default)]
    pub stream_start_delay_ms: Option<u64>,

    /// Interval between reveal ticks.
    #[serde(default)]
    pub reveal_tick_ms: Option<u64>,

    /// Characters revealed per tick.
    #[serde(default)]
    pub reveal_chunk_chars: Option<usize>,
}

/// Timing values after the profile and overrides have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedTiming {
    pub load_start_delay_ms: u64,
    pub load_tick_ms: u64,
    pub max_progress_increment: f64,
    pub stream_start_delay_ms: u64,
    pub reveal_tick_ms: u64,
    pub reveal_chunk_chars: usize,
}

impl Default for ResolvedTiming {
    fn default() -> Self {
        TimingProfile::Reference.timings()
    }
}

impl TimingConfig {
    pub fn resolve(&self) -> ResolvedTiming {
        let base = self.profile.timings();
        ResolvedTiming {
            load_start_delay_ms: self.load_start_delay_ms.unwrap_or(base.load_start_delay_ms),
            load_tick_ms: self.load_tick_ms.unwrap_or(base.load_tick_ms),
            max_progress_increment: self
                .max_progress_increment
                .unwrap_or(base.max_progress_increment),
            stream_start_delay_ms: self
                .stream_start_delay_ms
                .unwrap_or(base.stream_start_delay_ms),
            reveal_tick_ms: self.reveal_tick_ms.unwrap_or(base.reveal_tick_ms),
            reveal_chunk_chars: self.reveal_chunk_chars.unwrap_or(base.reveal_chunk_chars),
        }
    }
}

impl ResolvedTiming {
    pub fn validate(&self) -> Result<(), String> {
        if self.load_tick_ms == 0 {
            return Err("timing.load_tick_ms must be greater than 0".to_string());
        }
        if self.reveal_tick_ms == 0 {
            return Err("timing.reveal_tick_ms must be greater than 0".to_string());
        }
        if !self.max_progress_increment.is_finite() || self.max_progress_increment <= 0.0 {
            return Err(format!(
                "timing.max_progress_increment must be a positive number, got {}",
                self.max_progress_increment
            ));
        }
        if self.reveal_chunk_chars == 0 {
            return Err("timing.reveal_chunk_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Fills `{query}` in a fixed response template.
    Template(TemplateBackendConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Template(TemplateBackendConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateBackendConfig {
    #[serde(default = "default_response_template")]
    pub template: String,
}

pub const DEFAULT_RESPONSE_TEMPLATE: &str = "Response to query: \"{query}\"\n\nThe AI model has analyzed your request and generated this response. The system has processed your input parameters and synthesized the appropriate information based on available data.";

fn default_response_template() -> String {
    DEFAULT_RESPONSE_TEMPLATE.to_string()
}

impl Default for TemplateBackendConfig {
    fn default() -> Self {
        Self {
            template: default_response_template(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tui_enabled")]
    pub enabled: bool,

    /// Redraw interval when no controller event arrives.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
}

fn default_tui_enabled() -> bool {
    true
}

fn default_update_interval_ms() -> u64 {
    100
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            enabled: default_tui_enabled(),
            update_interval_ms: default_update_interval_ms(),
        }
    }
}
