//! Unicode normalization for pre-tokenization.
//!
//! Text is brought to a Unicode normal form and optionally case-folded before
//! it is split into words. Training and encoding must use the same normalizer.

use unicode_normalization::UnicodeNormalization;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// Canonical composition
    NFC,
    /// Compatibility composition
    #[default]
    NFKC,
    /// No normalization
    None,
}

/// Unicode normalizer.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Normalization form to apply
    form: NormalizationForm,
    /// Lowercase after normalizing
    lowercase: bool,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(form: NormalizationForm, lowercase: bool) -> Self {
        Self { form, lowercase }
    }

    /// NFKC, optionally followed by lowercasing.
    pub fn nfkc(lowercase: bool) -> Self {
        Self::new(NormalizationForm::NFKC, lowercase)
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        let normalized: String = match self.form {
            NormalizationForm::NFC => text.nfc().collect(),
            NormalizationForm::NFKC => text.nfkc().collect(),
            NormalizationForm::None => text.to_string(),
        };
        if self.lowercase {
            normalized.to_lowercase()
        } else {
            normalized
        }
    }

    /// Whether this normalizer case-folds.
    pub fn lowercase(&self) -> bool {
        self.lowercase
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::nfkc(false)
    }
}
