//! Package index, installs, and translation through the argos command-line tools.

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use super::AvailablePackage;
use crate::log_debug;

/// A program plus the leading arguments it is always invoked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Split a configured command line using shell quoting rules.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts = shell_words::split(raw.trim())
            .with_context(|| format!("failed to parse command '{raw}'"))?;
        let mut parts = parts.into_iter();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("command cannot be empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn display(&self) -> String {
        let mut words = vec![self.program.as_str()];
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }

    fn run(&self, extra: &[&str]) -> Result<String> {
        log_debug(&format!("running {} {}", self.display(), extra.join(" ")));
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to spawn {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                let code = output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                bail!("{} exited with code {code}", self.program);
            }
            bail!("{}", stderr.lines().last().unwrap_or(stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The two argos entry points: `argospm` for packages, `argos-translate` for text.
#[derive(Debug, Clone)]
pub struct ArgosTools {
    pub package_manager: ToolCommand,
    pub translator: ToolCommand,
}

impl ArgosTools {
    pub fn new(package_manager: ToolCommand, translator: ToolCommand) -> Self {
        Self {
            package_manager,
            translator,
        }
    }

    pub fn update_index(&self) -> Result<()> {
        self.package_manager
            .run(&["update"])
            .context("failed to update package index")?;
        Ok(())
    }

    pub fn search(&self) -> Result<Vec<AvailablePackage>> {
        let listing = self
            .package_manager
            .run(&["search"])
            .context("failed to list available packages")?;
        Ok(parse_package_listing(&listing))
    }

    pub fn install(&self, name: &str) -> Result<()> {
        self.package_manager
            .run(&["install", name])
            .with_context(|| format!("failed to install {name}"))?;
        Ok(())
    }

    pub fn list_installed(&self) -> Result<Vec<AvailablePackage>> {
        let listing = self
            .package_manager
            .run(&["list"])
            .context("failed to list installed packages")?;
        Ok(parse_package_listing(&listing))
    }

    /// `text` follows `--` so input such as `-hola` or `--help` stays positional.
    pub fn translate(&self, from: &str, to: &str, text: &str) -> Result<String> {
        let output = self
            .translator
            .run(&["--from-lang", from, "--to-lang", to, "--", text])?;
        Ok(output.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn package_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\btranslate-([a-z]{2,3})_([a-z]{2,3})\b").expect("valid package regex")
    })
}

/// Pull `translate-<from>_<to>` package names out of argospm output.
pub(crate) fn parse_package_listing(listing: &str) -> Vec<AvailablePackage> {
    let mut packages: Vec<AvailablePackage> = Vec::new();
    for caps in package_pattern().captures_iter(listing) {
        let package = AvailablePackage {
            name: caps[0].to_string(),
            from_code: caps[1].to_string(),
            to_code: caps[2].to_string(),
        };
        if !packages.contains(&package) {
            packages.push(package);
        }
    }
    packages
}
