use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use super::protocol::{parse_command, LanguagePair, Response};
use super::router::{dispatch, Flow};
use crate::config::WorkerConfig;
use crate::provider::{ArgosTools, Capabilities, LocalCapabilities};
use crate::{log_debug, log_debug_content};

// ============================================================================
// Session State
// ============================================================================

/// Process-lifetime state owned by the command loop.
///
/// Only `init` adds pairs; nothing removes them.
#[derive(Debug, Default)]
pub struct Session {
    installed_pairs: BTreeSet<LanguagePair>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the pair was already recorded.
    pub fn add_pair(&mut self, pair: LanguagePair) -> bool {
        self.installed_pairs.insert(pair)
    }

    pub fn installed_pairs(&self) -> Vec<LanguagePair> {
        self.installed_pairs.iter().cloned().collect()
    }
}

pub(super) struct IpcState<'a, C: Capabilities> {
    pub(super) provider: &'a C,
    pub(super) session: Session,
}

// ============================================================================
// Response Writing
// ============================================================================

/// Writes one JSON object per line and flushes after each.
pub struct ResponseWriter<W: Write> {
    out: W,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, response: &Response) -> io::Result<()> {
        let json = serde_json::to_string(response)?;
        writeln!(self.out, "{json}")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// ============================================================================
// Main Loop
// ============================================================================

/// How the command loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The parent sent `quit` and received `goodbye`.
    Quit,
    /// Input closed without a `quit`.
    EndOfInput,
}

/// Serve the protocol on this process's stdin/stdout.
pub fn run_ipc_mode(config: &WorkerConfig) -> Result<LoopExit> {
    log_debug("Starting JSON IPC mode");
    let tools = ArgosTools::new(config.package_manager()?, config.translator()?);
    let provider = LocalCapabilities::new(tools);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let exit = run_ipc_loop(&provider, stdin.lock(), stdout.lock())?;
    log_debug(&format!("IPC mode exiting ({exit:?})"));
    Ok(exit)
}

/// Run the command loop until `quit` or end of input.
///
/// Handler failures become `{"error": ...}` lines; only a broken output
/// stream or unreadable input ends the loop with an error.
pub fn run_ipc_loop<C, R, W>(provider: &C, mut input: R, output: W) -> Result<LoopExit>
where
    C: Capabilities,
    R: BufRead,
    W: Write,
{
    let mut out = ResponseWriter::new(output);
    let mut state = IpcState {
        provider,
        session: Session::new(),
    };

    out.emit(&Response::ready())
        .context("failed to write ready status")?;

    let mut buffer = Vec::with_capacity(4096);
    loop {
        buffer.clear();
        let bytes_read = input
            .read_until(b'\n', &mut buffer)
            .context("failed to read command")?;
        if bytes_read == 0 {
            log_debug("Input closed, exiting");
            return Ok(LoopExit::EndOfInput);
        }

        let line = String::from_utf8_lossy(&buffer);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let command = match parse_command(trimmed) {
            Ok(command) => command,
            Err(err) => {
                log_debug(&format!("Rejected line: {err}"));
                out.emit(&Response::from(err))
                    .context("failed to write response")?;
                continue;
            }
        };
        log_debug_content(&format!("IPC command received: {command:?}"));

        match dispatch(&mut state, &mut out, command).context("failed to write response")? {
            Flow::Continue => {}
            Flow::Stop => return Ok(LoopExit::Quit),
        }
    }
}
