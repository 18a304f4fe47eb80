use once_cell::sync::Lazy;
use regex::Regex;

// ASCII only: other scripts' digits would never match a stored key
static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]+").unwrap());

const MIN_DIGITS: usize = 9;
const MAX_DIGITS: usize = 15;

/// Canonical digit-only phone form used as the donor identity key
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    country_code: String,
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new("972")
    }
}

impl PhoneNormalizer {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    /// `None` when the value cannot be a phone number
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let mut digits = NON_DIGITS.replace_all(raw, "").into_owned();

        if let Some(rest) = digits.strip_prefix("00") {
            digits = rest.to_string();
        }

        // +972 50... -> 050...; a bare local number is shorter than code + 8 digits
        if !self.country_code.is_empty()
            && digits.starts_with(&self.country_code)
            && digits.len() >= self.country_code.len() + 8
        {
            digits = format!("0{}", &digits[self.country_code.len()..]);
        }

        // Spreadsheet numeric cells drop the trunk zero
        if digits.len() == MIN_DIGITS && !digits.starts_with('0') {
            digits.insert(0, '0');
        }

        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
            return None;
        }
        Some(digits)
    }
}
