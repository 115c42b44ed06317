//! Translation worker entrypoint.
//!
//! Validates configuration, sets up the log files, then serves the JSON-lines
//! protocol on stdin/stdout until `quit` or end of input.

use anyhow::Result;
use clap::Parser;
use std::panic;
use translation_worker::{
    config::WorkerConfig, doctor::base_doctor_report, ipc, log_debug, log_file_path, log_panic,
    telemetry::init_tracing,
};

fn main() -> Result<()> {
    let mut config = WorkerConfig::parse();
    if config.doctor {
        let report = base_doctor_report(&config, "translation-worker");
        println!("{}", report.render());
        return Ok(());
    }

    config.validate()?;
    init_tracing(&config);
    install_panic_hook();
    log_debug("=== Translation Worker Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let result = ipc::run_ipc_mode(&config);
    match &result {
        Ok(exit) => log_debug(&format!("=== Translation Worker Exiting ({exit:?}) ===")),
        Err(err) => log_debug(&format!("Exit with error: {err:#}")),
    }
    result.map(|_| ())
}

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        previous(info);
    }));
}
