//! JSON-lines protocol spoken with the parent process.
//!
//! Commands arrive one per line as JSON objects discriminated by `"cmd"`.
//! Responses are written one per line; their shape is recognised by which
//! keys are present rather than by a tag field.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// Commands (parent → worker)
// ============================================================================

/// A decoded command line.
///
/// Unknown or missing discriminators still decode; they become
/// [`Command::Unknown`] so the router can answer them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Install the Spanish ↔ English models.
    Init { user_language: String },
    /// Guess the language of `text`.
    Detect { text: String },
    /// Translate `text` between two installed languages.
    Translate {
        text: String,
        from: String,
        to: String,
    },
    /// End the session.
    Quit,
    /// Anything else; carries the rendered discriminator.
    Unknown { cmd: String },
}

impl Command {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Init { .. } => "init",
            Command::Detect { .. } => "detect",
            Command::Translate { .. } => "translate",
            Command::Quit => "quit",
            Command::Unknown { .. } => "unknown",
        }
    }
}

/// Decode one trimmed, non-empty input line.
///
/// Anything that is not a JSON object is `InvalidJson`. Text and language
/// code fields that are present with a non-string value fail with the owning
/// command's prefix. `userLanguage` is only logged, so any value is accepted.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let value: Value = serde_json::from_str(line).map_err(|_| CommandError::InvalidJson)?;
    let Value::Object(fields) = value else {
        return Err(CommandError::InvalidJson);
    };

    let command = match fields.get("cmd") {
        Some(Value::String(cmd)) => match cmd.as_str() {
            "init" => Command::Init {
                user_language: rendered_field(&fields, "userLanguage", "en"),
            },
            "detect" => Command::Detect {
                text: string_field(&fields, "text", "").map_err(CommandError::Detection)?,
            },
            "translate" => Command::Translate {
                text: string_field(&fields, "text", "").map_err(CommandError::Translation)?,
                from: string_field(&fields, "from", "").map_err(CommandError::Translation)?,
                to: string_field(&fields, "to", "").map_err(CommandError::Translation)?,
            },
            "quit" => Command::Quit,
            other => Command::Unknown {
                cmd: other.to_string(),
            },
        },
        _ => Command::Unknown {
            cmd: rendered_field(&fields, "cmd", ""),
        },
    };
    Ok(command)
}

/// Any JSON value as text: strings verbatim, other values as compact JSON.
fn rendered_field(fields: &Map<String, Value>, key: &str, default: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(value)) => value.clone(),
        Some(other) => other.to_string(),
    }
}

fn string_field(fields: &Map<String, Value>, key: &str, default: &str) -> Result<String, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(format!("field `{key}` must be a string")),
    }
}

// ============================================================================
// Responses (worker → parent)
// ============================================================================

/// An installed translation direction, serialized as `[from, to]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LanguagePair(pub String, pub String);

impl LanguagePair {
    pub fn new(from: &str, to: &str) -> Self {
        Self(from.to_string(), to.to_string())
    }
}

/// Lifecycle markers written outside of any command's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Ready,
    Goodbye,
}

/// Every line the worker writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Status {
        status: WorkerStatus,
    },
    Progress {
        progress: u32,
        total: u32,
        message: String,
    },
    Initialized {
        success: bool,
        installed: Vec<LanguagePair>,
    },
    Detection {
        language: Option<String>,
        #[serde(serialize_with = "serialize_confidence")]
        confidence: f64,
    },
    Translation {
        #[serde(rename = "translatedText")]
        translated_text: String,
        from: String,
        to: String,
    },
    Error {
        error: String,
    },
}

impl Response {
    pub fn ready() -> Self {
        Response::Status {
            status: WorkerStatus::Ready,
        }
    }

    pub fn goodbye() -> Self {
        Response::Status {
            status: WorkerStatus::Goodbye,
        }
    }

    pub fn progress(progress: u32, total: u32, message: &str) -> Self {
        Response::Progress {
            progress,
            total,
            message: message.to_string(),
        }
    }

    /// Detection result for text whose language could not be determined.
    pub fn undetermined() -> Self {
        Response::Detection {
            language: None,
            confidence: 0.0,
        }
    }
}

impl From<CommandError> for Response {
    fn from(err: CommandError) -> Self {
        Response::Error {
            error: err.to_string(),
        }
    }
}

// Undetermined results carry the integer `0`, not `0.0`.
fn serialize_confidence<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if *value == 0.0 {
        serializer.serialize_u8(0)
    } else {
        serializer.serialize_f64(*value)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failures surfaced to the parent as `{"error": "..."}`.
///
/// None of these end the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Failed to initialize: {0}")]
    Initialize(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Language pair {from} -> {to} not installed")]
    PairNotInstalled { from: String, to: String },

    #[error("No translation available for {from} -> {to}")]
    NoTranslation { from: String, to: String },

    #[error("Translation failed: {0}")]
    Translation(String),
}
