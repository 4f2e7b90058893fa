//! Locale numeral normalization for bulletin price cells.

use crate::constants::{DEVANAGARI_DIGITS, LANG_NEPALI, LANG_NEPALI_ISO};
use std::collections::HashMap;

/// Translates locale digit glyphs to ASCII digits and parses the result.
///
/// Total: any input yields a finite number, unparsable text yields `0.0`.
#[derive(Debug, Clone)]
pub struct NumeralNormalizer {
    glyphs: HashMap<String, [char; 10]>,
}

impl NumeralNormalizer {
    /// A normalizer with no localized-numeral locales registered.
    pub fn plain() -> Self {
        Self {
            glyphs: HashMap::new(),
        }
    }

    pub fn with_locale(mut self, lang: &str, digits: [char; 10]) -> Self {
        self.glyphs.insert(lang.to_lowercase(), digits);
        self
    }

    pub fn normalize(&self, text: &str, lang: &str) -> f64 {
        match self.glyphs.get(&lang.to_lowercase()) {
            Some(digits) => {
                let ascii: String = text.chars().map(|c| translate_glyph(c, digits)).collect();
                parse_decimal(&ascii)
            }
            None => parse_decimal(text),
        }
    }
}

impl Default for NumeralNormalizer {
    fn default() -> Self {
        Self::plain()
            .with_locale(LANG_NEPALI, DEVANAGARI_DIGITS)
            .with_locale(LANG_NEPALI_ISO, DEVANAGARI_DIGITS)
    }
}

fn translate_glyph(c: char, digits: &[char; 10]) -> char {
    match digits.iter().position(|d| *d == c) {
        // position is always < 10
        Some(i) => char::from(b'0' + i as u8),
        None => c,
    }
}

fn parse_decimal(text: &str) -> f64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
