//! JSON-lines log files fed by the worker's `tracing` events.
//!
//! Two sinks: the main log keeps whatever [`event_filter`] allows for the
//! current flags, and the crash log keeps only panic entries.

use crate::app::{
    crash_log_path, log_file_path, CONTENT_TARGET, CRASH_TARGET, DEBUG_TARGET, TIMING_TARGET,
};
use crate::config::WorkerConfig;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;

/// Which worker targets the main log keeps.
///
/// Content and timing events are off unless their flags are set; events
/// from other crates are never kept.
pub fn event_filter(config: &WorkerConfig) -> Targets {
    let content = if config.log_content {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    let timing = if config.log_timings {
        LevelFilter::INFO
    } else {
        LevelFilter::OFF
    };
    Targets::new()
        .with_target(DEBUG_TARGET, LevelFilter::DEBUG)
        .with_target(CRASH_TARGET, LevelFilter::ERROR)
        .with_target(CONTENT_TARGET, content)
        .with_target(TIMING_TARGET, timing)
}

/// Install the file sinks. Does nothing when logging is disabled or the main
/// log cannot be opened.
pub fn init_tracing(config: &WorkerConfig) {
    if !config.logging_enabled() {
        return;
    }
    let Some(log_file) = open_capped(&log_file_path(), LOG_MAX_BYTES) else {
        return;
    };
    let crash_layer = open_capped(&crash_log_path(), CRASH_LOG_MAX_BYTES).map(|file| {
        json_lines(file).with_filter(Targets::new().with_target(CRASH_TARGET, LevelFilter::ERROR))
    });

    let subscriber = tracing_subscriber::registry()
        .with(json_lines(log_file).with_filter(event_filter(config)))
        .with(crash_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn json_lines<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(Mutex::new(file))
}

/// Open `path` for appending, starting over once it has grown past `max_bytes`.
fn open_capped(path: &Path, max_bytes: u64) -> Option<File> {
    let oversized = fs::metadata(path)
        .map(|meta| meta.len() > max_bytes)
        .unwrap_or(false);
    OpenOptions::new()
        .create(true)
        .write(true)
        .append(!oversized)
        .truncate(oversized)
        .open(path)
        .ok()
}
