use std::path::PathBuf;

use clap::Parser;
use quantum_core::api::{TimingConfig, TimingProfile};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileArg {
    Reference,
    Fast,
    Instant,
}

impl From<ProfileArg> for TimingProfile {
    fn from(p: ProfileArg) -> Self {
        match p {
            ProfileArg::Reference => TimingProfile::Reference,
            ProfileArg::Fast => TimingProfile::Fast,
            ProfileArg::Instant => TimingProfile::Instant,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "quantum", version, about = "Simulated on-device language model console")]
pub struct Args {
    /// Config file to load instead of the default lookup.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Timing preset. Explicit timing flags still win.
    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,

    #[arg(long)]
    pub load_start_delay_ms: Option<u64>,

    #[arg(long)]
    pub load_tick_ms: Option<u64>,

    #[arg(long)]
    pub max_progress_increment: Option<f64>,

    #[arg(long)]
    pub stream_start_delay_ms: Option<u64>,

    #[arg(long)]
    pub reveal_tick_ms: Option<u64>,

    #[arg(long)]
    pub reveal_chunk_chars: Option<usize>,

    /// Run headless: wait for the model, submit this query, stream the answer.
    #[arg(long)]
    pub prompt: Option<String>,

    /// Headless output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Never start the interactive UI.
    #[arg(long)]
    pub no_tui: bool,

    /// Fail the model load after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub inject_load_fault: Option<u64>,
}

impl Args {
    /// Layer the command-line timing flags over the configured `[timing]` table.
    pub fn apply_timing_overrides(&self, timing: &mut TimingConfig) {
        if let Some(p) = self.profile {
            timing.profile = p.into();
        }
        if self.load_start_delay_ms.is_some() {
            timing.load_start_delay_ms = self.load_start_delay_ms;
        }
        if self.load_tick_ms.is_some() {
            timing.load_tick_ms = self.load_tick_ms;
        }
        if self.max_progress_increment.is_some() {
            timing.max_progress_increment = self.max_progress_increment;
        }
        if self.stream_start_delay_ms.is_some() {
            timing.stream_start_delay_ms = self.stream_start_delay_ms;
        }
        if self.reveal_tick_ms.is_some() {
            timing.reveal_tick_ms = self.reveal_tick_ms;
        }
        if self.reveal_chunk_chars.is_some() {
            timing.reveal_chunk_chars = self.reveal_chunk_chars;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flags_override_profile_values() {
        let args = Args::parse_from([
            "quantum",
            "--profile",
            "fast",
            "--reveal-tick-ms",
            "5",
            "--prompt",
            "hi",
            "--format",
            "jsonl",
        ]);
        let mut timing = TimingConfig {
            load_tick_ms: Some(999),
            ..Default::default()
        };
        args.apply_timing_overrides(&mut timing);

        let resolved = timing.resolve();
        let fast = TimingProfile::Fast.timings();
        assert_eq!(resolved.reveal_tick_ms, 5);
        assert_eq!(resolved.load_tick_ms, 999);
        assert_eq!(resolved.stream_start_delay_ms, fast.stream_start_delay_ms);
        assert_eq!(args.format, OutputFormat::Jsonl);
        assert_eq!(args.prompt.as_deref(), Some("hi"));
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["quantum"]);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.no_tui);
        assert!(args.inject_load_fault.is_none());
    }
}
