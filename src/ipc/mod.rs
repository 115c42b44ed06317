//! JSON-lines command loop spoken over stdin/stdout.
//!
//! The parent writes one JSON command per line and reads back one JSON
//! response per line. Commands run strictly one at a time, so responses are
//! matched to commands by order alone.
//!
//! Protocol:
//! - Startup (worker → parent): `{"status": "ready"}`
//! - Commands (parent → worker): `{"cmd": "init" | "detect" | "translate" | "quit", ...}`
//! - Progress (worker → parent, `init` only): `{"progress": n, "total": 4, "message": "..."}`
//! - Failures (worker → parent): `{"error": "..."}`; the session continues

mod protocol;
mod router;
mod session;


pub use protocol::{parse_command, Command, CommandError, LanguagePair, Response, WorkerStatus};
pub use session::{run_ipc_loop, run_ipc_mode, LoopExit, ResponseWriter, Session};
