pub mod app;
pub mod config;
pub mod doctor;
pub mod ipc;
pub mod provider;
pub mod telemetry;

pub use app::{crash_log_path, log_debug, log_debug_content, log_file_path, log_panic};
pub use ipc::{run_ipc_loop, run_ipc_mode, LoopExit};
