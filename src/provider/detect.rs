//! Trigram language detection.

use isolang::Language;
use whatlang::{Detector, Lang};

use super::{DetectionError, LanguageGuess};

/// Wraps a whatlang detector and reports ISO 639-1 codes.
pub struct WhatlangDetector {
    detector: Detector,
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }

    /// whatlang settles on a single language, so the ranking has at most one entry.
    pub fn detect_ranked(&self, text: &str) -> Result<Vec<LanguageGuess>, DetectionError> {
        let info = self
            .detector
            .detect(text)
            .ok_or(DetectionError::Undetermined)?;
        Ok(vec![LanguageGuess {
            lang: short_code(info.lang()).to_string(),
            prob: info.confidence().clamp(0.0, 1.0),
        }])
    }
}

fn short_code(lang: Lang) -> &'static str {
    match lang {
        // Mandarin has no two-letter code of its own.
        Lang::Cmn => "zh",
        other => Language::from_639_3(other.code())
            .and_then(|language| language.to_639_1())
            .unwrap_or_else(|| other.code()),
    }
}
