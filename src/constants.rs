//! Language tags, file layout and defaults shared across the crate.

pub const LANG_ENGLISH: &str = "en";
pub const LANG_NEPALI: &str = "np";
// ISO 639-1 tag for Nepali, accepted alongside the bulletin's own "np"
pub const LANG_NEPALI_ISO: &str = "ne";

pub const DEFAULT_LANG: &str = LANG_ENGLISH;

/// Extension of the bulletin document stored per language
pub const BULLETIN_EXTENSION: &str = "html";

/// Minimum number of cells a table row needs to count as a price row
pub const MIN_ROW_CELLS: usize = 5;

pub const DEFAULT_BULLETIN_DIR: &str = "data/bulletins";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

pub const SERVICE_NAME: &str = "market-prices";

/// Devanagari digits zero through nine
pub const DEVANAGARI_DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

/// Get all languages with a bundled bulletin
pub fn get_supported_langs() -> Vec<&'static str> {
    vec![LANG_ENGLISH, LANG_NEPALI]
}

/// Language tags are used as file stems, so only a conservative charset is allowed.
pub fn is_valid_lang_tag(lang: &str) -> bool {
    !lang.is_empty()
        && lang.len() <= 16
        && lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
