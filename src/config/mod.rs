//! Command-line parsing and validation helpers.

mod validation;

use clap::Parser;

pub const DEFAULT_ARGOSPM_CMD: &str = "argospm";
pub const DEFAULT_ARGOS_TRANSLATE_CMD: &str = "argos-translate";

/// CLI options for the translation worker. Validated values keep spawned tools safe.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Translation worker speaking JSON lines over stdin/stdout",
    author,
    version
)]
pub struct WorkerConfig {
    /// Package manager command (may include arguments)
    #[arg(
        long = "argospm-cmd",
        env = "TRANSLATION_WORKER_ARGOSPM",
        default_value = DEFAULT_ARGOSPM_CMD
    )]
    pub argospm_cmd: String,

    /// Translation command (may include arguments)
    #[arg(
        long = "argos-translate-cmd",
        env = "TRANSLATION_WORKER_ARGOS_TRANSLATE",
        default_value = DEFAULT_ARGOS_TRANSLATE_CMD
    )]
    pub argos_translate_cmd: String,

    /// Print environment diagnostics and exit
    #[arg(long = "doctor", default_value_t = false)]
    pub doctor: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "TRANSLATION_WORKER_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(
        long = "no-logs",
        env = "TRANSLATION_WORKER_NO_LOGS",
        default_value_t = false
    )]
    pub no_logs: bool,

    /// Allow logging text snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "TRANSLATION_WORKER_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Record per-command elapsed time (implies --logs)
    #[arg(
        long = "log-timings",
        env = "TRANSLATION_WORKER_LOG_TIMINGS",
        default_value_t = false
    )]
    pub log_timings: bool,
}

impl WorkerConfig {
    /// Whether any file logging should happen.
    pub fn logging_enabled(&self) -> bool {
        (self.logs || self.log_timings) && !self.no_logs
    }
}
