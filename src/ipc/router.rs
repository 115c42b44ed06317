use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use super::protocol::{Command, CommandError, LanguagePair, Response};
use super::session::{IpcState, ResponseWriter};
use crate::app::{panic_text, DEBUG_TARGET, TIMING_TARGET};
use crate::provider::{AvailablePackage, Capabilities, DetectionError};
use crate::{log_debug, log_debug_content};

/// Result of one handler: the success payload or the error to report.
pub(super) type Outcome = Result<Response, CommandError>;

/// Whether the loop should read another command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Stop,
}

/// Trimmed text shorter than this is not worth sending to the detector.
pub(super) const MIN_DETECT_CHARS: usize = 3;

const INIT_TOTAL_STEPS: u32 = 4;

/// Directions installed by `init`, in install order, with their progress text.
const INIT_DIRECTIONS: [(&str, &str, &str); 2] = [
    ("es", "en", "Downloading Spanish → English..."),
    ("en", "es", "Downloading English → Spanish..."),
];

// ============================================================================
// Dispatch
// ============================================================================

/// Run one command to completion and write its terminal response.
///
/// The only error returned is a failed write; every handler fault, panics
/// included, is turned into an error response here.
pub(super) fn dispatch<C, W>(
    state: &mut IpcState<'_, C>,
    out: &mut ResponseWriter<W>,
    command: Command,
) -> io::Result<Flow>
where
    C: Capabilities,
    W: Write,
{
    let name = command.name();
    let started = Instant::now();

    let outcome = match command {
        Command::Quit => {
            tracing::debug!(target: DEBUG_TARGET, command = name, "session ending");
            out.emit(&Response::goodbye())?;
            return Ok(Flow::Stop);
        }
        Command::Unknown { cmd } => Err(CommandError::UnknownCommand(cmd)),
        Command::Init { user_language } => guarded(CommandError::Initialize, || {
            handle_init(state, out, &user_language)
        })?,
        Command::Detect { text } => guarded(CommandError::Detection, || {
            Ok(handle_detect(state.provider, &text))
        })?,
        Command::Translate { text, from, to } => guarded(CommandError::Translation, || {
            Ok(handle_translate(state.provider, &text, &from, &to))
        })?,
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        target: TIMING_TARGET,
        command = name,
        elapsed_ms,
        ok = outcome.is_ok(),
        "command finished"
    );
    if let Err(err) = &outcome {
        tracing::warn!(target: DEBUG_TARGET, command = name, error = %err, "command failed");
    }

    out.emit(&outcome.unwrap_or_else(Response::from))?;
    Ok(Flow::Continue)
}

/// Run a handler, converting a panic into that command's failure.
fn guarded<F>(fault: fn(String) -> CommandError, handler: F) -> io::Result<Outcome>
where
    F: FnOnce() -> io::Result<Outcome>,
{
    match panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log_debug_content(&format!("Handler panicked: {message}"));
            Ok(Err(fault(message)))
        }
    }
}

pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    panic_text(payload).unwrap_or("handler panicked").to_string()
}

// ============================================================================
// Command Handlers
// ============================================================================

/// Install Spanish → English and English → Spanish, reporting four progress steps.
///
/// `user_language` is logged but does not change which directions are
/// installed. Pairs installed before a failure stay in the session.
pub(super) fn handle_init<C, W>(
    state: &mut IpcState<'_, C>,
    out: &mut ResponseWriter<W>,
    user_language: &str,
) -> io::Result<Outcome>
where
    C: Capabilities,
    W: Write,
{
    log_debug(&format!(
        "init requested for userLanguage={user_language}; installing es <-> en"
    ));

    out.emit(&Response::progress(
        1,
        INIT_TOTAL_STEPS,
        "Fetching package index...",
    ))?;
    let available = match fetch_package_index(state.provider) {
        Ok(packages) => packages,
        Err(err) => return Ok(Err(init_failure(err))),
    };

    for (step, (from, to, message)) in (2..).zip(INIT_DIRECTIONS) {
        out.emit(&Response::progress(step, INIT_TOTAL_STEPS, message))?;
        if let Err(err) = install_direction(state, &available, from, to) {
            return Ok(Err(init_failure(err)));
        }
    }

    out.emit(&Response::progress(4, INIT_TOTAL_STEPS, "Ready!"))?;
    Ok(Ok(Response::Initialized {
        success: true,
        installed: state.session.installed_pairs(),
    }))
}

fn fetch_package_index<C: Capabilities>(provider: &C) -> anyhow::Result<Vec<AvailablePackage>> {
    provider.refresh_package_index()?;
    provider.available_packages()
}

fn install_direction<C: Capabilities>(
    state: &mut IpcState<'_, C>,
    available: &[AvailablePackage],
    from: &str,
    to: &str,
) -> anyhow::Result<()> {
    let Some(package) = available.iter().find(|p| p.translates(from, to)) else {
        log_debug(&format!("No package for {from} -> {to}; skipping"));
        return Ok(());
    };
    state.provider.install_package(package)?;
    if state.session.add_pair(LanguagePair::new(from, to)) {
        log_debug(&format!("Installed {}", package.name));
    }
    Ok(())
}

fn init_failure(err: anyhow::Error) -> CommandError {
    CommandError::Initialize(format!("{err:#}"))
}

/// Report the best-ranked language for `text`.
pub(super) fn handle_detect<C: Capabilities>(provider: &C, text: &str) -> Outcome {
    if text.trim().chars().count() < MIN_DETECT_CHARS {
        return Ok(Response::undetermined());
    }

    match provider.detect_ranked(text) {
        Ok(ranked) => Ok(ranked
            .into_iter()
            .next()
            .map(|best| Response::Detection {
                language: Some(best.lang),
                confidence: best.prob,
            })
            .unwrap_or_else(Response::undetermined)),
        Err(DetectionError::Undetermined) => Ok(Response::undetermined()),
        Err(DetectionError::Failed(err)) => Err(CommandError::Detection(format!("{err:#}"))),
    }
}

/// Translate through the provider's installed languages.
///
/// The provider's registry is the source of truth here, not the session's
/// pair list.
pub(super) fn handle_translate<C: Capabilities>(
    provider: &C,
    text: &str,
    from: &str,
    to: &str,
) -> Outcome {
    let languages = provider.installed_languages().map_err(translation_failure)?;
    let source = languages.iter().find(|lang| lang.code == from);
    let target = languages.iter().find(|lang| lang.code == to);
    let (Some(source), Some(target)) = (source, target) else {
        return Err(CommandError::PairNotInstalled {
            from: from.to_string(),
            to: to.to_string(),
        });
    };

    let translation = source
        .translation_to(target)
        .ok_or_else(|| CommandError::NoTranslation {
            from: from.to_string(),
            to: to.to_string(),
        })?;

    log_debug_content(&format!("Translating {from} -> {to}: {text}"));
    let translated_text = provider
        .translate(&translation, text)
        .map_err(translation_failure)?;

    Ok(Response::Translation {
        translated_text,
        from: from.to_string(),
        to: to.to_string(),
    })
}

fn translation_failure(err: anyhow::Error) -> CommandError {
    CommandError::Translation(format!("{err:#}"))
}
