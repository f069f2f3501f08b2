use crate::domain::phone::{digits_only, SUFFIX_LEN};
use crate::error::CoreError;
use std::fmt;

pub const DEFAULT_PAGE_CEILING: u32 = 10;
pub const MIN_PAGE_CEILING: u32 = 1;
pub const MAX_PAGE_CEILING: u32 = 20;

/// Exactly four ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigitKey(String);

impl DigitKey {
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let digits = digits_only(input);
        if digits.len() != SUFFIX_LEN {
            return Err(CoreError::InvalidDigits);
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DigitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCeiling(u32);

impl PageCeiling {
    pub fn new(pages: i64) -> Self {
        let clamped = pages.clamp(MIN_PAGE_CEILING as i64, MAX_PAGE_CEILING as i64);
        Self(clamped as u32)
    }

    /// Blank or non-numeric input falls back to the default ceiling.
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim).and_then(parse_saturating) {
            Some(pages) => Self::new(pages),
            None => Self::default(),
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for PageCeiling {
    fn default() -> Self {
        Self(DEFAULT_PAGE_CEILING)
    }
}

/// Integers too wide for `i64` saturate instead of being rejected.
fn parse_saturating(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub key: DigitKey,
    pub pages: PageCeiling,
}

impl LookupRequest {
    pub fn parse(digits: Option<&str>, pages: Option<&str>) -> Result<Self, CoreError> {
        let digits = digits.ok_or(CoreError::MissingDigits)?;
        if digits.trim().is_empty() {
            return Err(CoreError::MissingDigits);
        }
        Ok(Self {
            key: DigitKey::parse(digits)?,
            pages: PageCeiling::parse(pages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DigitKey, LookupRequest, PageCeiling, DEFAULT_PAGE_CEILING};
    use crate::error::CoreError;

    #[test]
    fn digit_key_accepts_four_digits() {
        assert_eq!(DigitKey::parse("1234").expect("key").as_str(), "1234");
        assert_eq!(DigitKey::parse(" 12-34 ").expect("key").as_str(), "1234");
    }

    #[test]
    fn digit_key_rejects_wrong_length() {
        assert_eq!(DigitKey::parse("12a4"), Err(CoreError::InvalidDigits));
        assert_eq!(DigitKey::parse("123"), Err(CoreError::InvalidDigits));
        assert_eq!(DigitKey::parse("12345"), Err(CoreError::InvalidDigits));
        assert_eq!(DigitKey::parse("abcd"), Err(CoreError::InvalidDigits));
    }

    #[test]
    fn page_ceiling_clamps_and_defaults() {
        assert_eq!(PageCeiling::parse(None).get(), DEFAULT_PAGE_CEILING);
        assert_eq!(PageCeiling::parse(Some("")).get(), DEFAULT_PAGE_CEILING);
        assert_eq!(PageCeiling::parse(Some("lots")).get(), DEFAULT_PAGE_CEILING);
        assert_eq!(PageCeiling::parse(Some("0")).get(), 1);
        assert_eq!(PageCeiling::parse(Some("-3")).get(), 1);
        assert_eq!(PageCeiling::parse(Some(" 2 ")).get(), 2);
        assert_eq!(PageCeiling::parse(Some("500")).get(), 20);
        assert_eq!(PageCeiling::parse(Some("+7")).get(), 7);
    }

    #[test]
    fn page_ceiling_saturates_oversized_numbers() {
        assert_eq!(PageCeiling::parse(Some("99999999999999999999")).get(), 20);
        assert_eq!(PageCeiling::parse(Some("+99999999999999999999")).get(), 20);
        assert_eq!(PageCeiling::parse(Some("-99999999999999999999")).get(), 1);
        assert_eq!(
            PageCeiling::parse(Some("99999999999999999999x")).get(),
            DEFAULT_PAGE_CEILING
        );
        assert_eq!(PageCeiling::parse(Some("-")).get(), DEFAULT_PAGE_CEILING);
    }

    #[test]
    fn lookup_request_requires_digits() {
        assert_eq!(
            LookupRequest::parse(None, Some("3")),
            Err(CoreError::MissingDigits)
        );
        assert_eq!(
            LookupRequest::parse(Some("  "), None),
            Err(CoreError::MissingDigits)
        );
        let request = LookupRequest::parse(Some("0958"), Some("3")).expect("request");
        assert_eq!(request.key.as_str(), "0958");
        assert_eq!(request.pages.get(), 3);
    }
}
