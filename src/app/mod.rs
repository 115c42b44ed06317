mod logging;

pub(crate) use logging::panic_text;
pub use logging::{
    crash_log_path, log_debug, log_debug_content, log_file_path, log_panic, CONTENT_TARGET,
    CRASH_TARGET, DEBUG_TARGET, TIMING_TARGET,
};
