use super::WorkerConfig;
use crate::provider::ToolCommand;
use anyhow::{anyhow, bail, Context, Result};
use std::{fs, path::Path};

/// Interpreters allowed in front of a module invocation such as
/// `python3 -m argostranslate.argospm`.
const PYTHON_LAUNCHERS: &[&str] = &["python3", "python"];

impl WorkerConfig {
    /// Check CLI values and normalize tool paths.
    pub fn validate(&mut self) -> Result<()> {
        self.argospm_cmd = sanitize_tool(&self.argospm_cmd, "--argospm-cmd", &["argospm"])?;
        self.argos_translate_cmd = sanitize_tool(
            &self.argos_translate_cmd,
            "--argos-translate-cmd",
            &["argos-translate"],
        )?;
        Ok(())
    }

    pub fn package_manager(&self) -> Result<ToolCommand> {
        ToolCommand::parse(&self.argospm_cmd).context("invalid --argospm-cmd")
    }

    pub fn translator(&self) -> Result<ToolCommand> {
        ToolCommand::parse(&self.argos_translate_cmd).context("invalid --argos-translate-cmd")
    }
}

/// Validate a tool command line, canonicalizing its program when it is a path.
pub(super) fn sanitize_tool(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    if value.trim().is_empty() {
        bail!("{flag} cannot be empty");
    }
    let command = ToolCommand::parse(value).with_context(|| format!("invalid {flag}"))?;
    let mut allowed: Vec<&str> = allowlist.to_vec();
    if !command.args.is_empty() {
        allowed.extend_from_slice(PYTHON_LAUNCHERS);
    }
    let program = sanitize_binary(&command.program, flag, &allowed)?;
    Ok(ToolCommand {
        program,
        args: command.args,
    }
    .display())
}

pub(super) fn sanitize_binary(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if let Some(allowed) = allowlist
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*allowed).to_string());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    bail!("{flag} must be one of {allowlist:?} or an existing binary path");
}
