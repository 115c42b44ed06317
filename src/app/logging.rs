//! Worker log events.
//!
//! Nothing here touches the filesystem. Events are tagged with one of the
//! targets below and [`crate::telemetry::init_tracing`] decides which of them
//! reach disk, so stdout stays reserved for the protocol.

use std::{any::Any, env, panic, path::PathBuf};

/// Operational messages that never quote user text.
pub const DEBUG_TARGET: &str = "translation_worker::debug";
/// Messages quoting detection input or translations (`--log-content`).
pub const CONTENT_TARGET: &str = "translation_worker::content";
/// Per-command elapsed time (`--log-timings`).
pub const TIMING_TARGET: &str = "translation_worker::timing";
/// Panic location and version, mirrored into the crash log.
pub const CRASH_TARGET: &str = "translation_worker::crash";

/// Main JSON-lines log, `$TRANSLATION_WORKER_LOG` or a file in the temp dir.
pub fn log_file_path() -> PathBuf {
    env::var_os("TRANSLATION_WORKER_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("translation_worker.log"))
}

pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("translation_worker_crash.log")
}

pub fn log_debug(msg: &str) {
    tracing::debug!(target: DEBUG_TARGET, "{msg}");
}

pub fn log_debug_content(msg: &str) {
    tracing::debug!(target: CONTENT_TARGET, "{msg}");
}

/// Crash entries carry only the location; the payload may quote user text
/// and is logged as content.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    tracing::error!(
        target: CRASH_TARGET,
        location = %location,
        version = env!("CARGO_PKG_VERSION"),
        "panic"
    );
    if let Some(text) = panic_text(info.payload()) {
        log_debug_content(&format!("panic at {location}: {text}"));
    }
}

/// The message of a `panic!` with a string payload.
pub(crate) fn panic_text(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}
