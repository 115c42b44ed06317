//! Language detection and offline translation capabilities.
//!
//! The protocol engine only talks to [`Capabilities`]; everything behind it
//! (trigram detection, the argos package tooling) is swappable.

mod argos;
mod detect;

pub use argos::{ArgosTools, ToolCommand};
pub use detect::WhatlangDetector;

use anyhow::Result;

/// One candidate from ranked detection.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    /// ISO 639-1 code when one exists, otherwise ISO 639-3.
    pub lang: String,
    /// Probability in `[0, 1]`.
    pub prob: f64,
}

/// Why ranked detection produced nothing.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// The detector could not settle on any language. Not a fault.
    #[error("no language could be determined")]
    Undetermined,
    #[error("{0:#}")]
    Failed(anyhow::Error),
}

/// A package listed in the refreshed index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailablePackage {
    pub name: String,
    pub from_code: String,
    pub to_code: String,
}

impl AvailablePackage {
    pub fn translates(&self, from: &str, to: &str) -> bool {
        self.from_code == from && self.to_code == to
    }
}

/// A language the installed packages can translate from or to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledLanguage {
    pub code: String,
    /// Codes reachable from this language, direct routes first, then routes
    /// through one intermediate language.
    pub targets: Vec<String>,
}

impl InstalledLanguage {
    /// Route from this language to `target`, if one is installed.
    pub fn translation_to(&self, target: &InstalledLanguage) -> Option<Translation> {
        self.targets
            .iter()
            .any(|code| *code == target.code)
            .then(|| Translation {
                from: self.code.clone(),
                to: target.code.clone(),
            })
    }
}

/// Build the installed-language registry from installed directions.
///
/// Like argos, a missing direction is bridged through one intermediate
/// language when both legs are installed (`es -> en -> fr`).
pub fn languages_from_pairs<'a, I>(pairs: I) -> Vec<InstalledLanguage>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut languages: Vec<InstalledLanguage> = Vec::new();
    for (from, to) in pairs {
        for code in [from, to] {
            if !languages.iter().any(|lang| lang.code == code) {
                languages.push(InstalledLanguage {
                    code: code.to_string(),
                    targets: Vec::new(),
                });
            }
        }
        if let Some(source) = languages.iter_mut().find(|lang| lang.code == from) {
            if !source.targets.iter().any(|code| code == to) {
                source.targets.push(to.to_string());
            }
        }
    }

    let direct: Vec<(String, Vec<String>)> = languages
        .iter()
        .map(|lang| (lang.code.clone(), lang.targets.clone()))
        .collect();
    for language in &mut languages {
        let onward: Vec<&String> = language
            .targets
            .iter()
            .filter_map(|via| direct.iter().find(|(code, _)| code == via))
            .flat_map(|(_, targets)| targets)
            .collect();
        let mut bridged: Vec<String> = Vec::new();
        for code in onward {
            if *code != language.code && !language.targets.contains(code) && !bridged.contains(code) {
                bridged.push(code.clone());
            }
        }
        language.targets.extend(bridged);
    }
    languages
}

/// A resolved translation route between two installed languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub from: String,
    pub to: String,
}

/// Everything the worker needs from its detection and translation backends.
///
/// Every call may block for as long as the backend needs; none are retried.
pub trait Capabilities {
    fn refresh_package_index(&self) -> Result<()>;
    fn available_packages(&self) -> Result<Vec<AvailablePackage>>;
    /// Download and install one package.
    fn install_package(&self, package: &AvailablePackage) -> Result<()>;
    /// Live view of the backend's installed languages.
    fn installed_languages(&self) -> Result<Vec<InstalledLanguage>>;
    /// Candidates ordered best first.
    fn detect_ranked(&self, text: &str) -> Result<Vec<LanguageGuess>, DetectionError>;
    fn translate(&self, translation: &Translation, text: &str) -> Result<String>;
}

/// Production capabilities: whatlang for detection, argos tools for the rest.
pub struct LocalCapabilities {
    detector: WhatlangDetector,
    tools: ArgosTools,
}

impl LocalCapabilities {
    pub fn new(tools: ArgosTools) -> Self {
        Self {
            detector: WhatlangDetector::new(),
            tools,
        }
    }
}

impl Capabilities for LocalCapabilities {
    fn refresh_package_index(&self) -> Result<()> {
        self.tools.update_index()
    }

    fn available_packages(&self) -> Result<Vec<AvailablePackage>> {
        self.tools.search()
    }

    fn install_package(&self, package: &AvailablePackage) -> Result<()> {
        self.tools.install(&package.name)
    }

    fn installed_languages(&self) -> Result<Vec<InstalledLanguage>> {
        let installed = self.tools.list_installed()?;
        Ok(languages_from_pairs(
            installed
                .iter()
                .map(|package| (package.from_code.as_str(), package.to_code.as_str())),
        ))
    }

    fn detect_ranked(&self, text: &str) -> Result<Vec<LanguageGuess>, DetectionError> {
        self.detector.detect_ranked(text)
    }

    fn translate(&self, translation: &Translation, text: &str) -> Result<String> {
        self.tools.translate(&translation.from, &translation.to, text)
    }
}
