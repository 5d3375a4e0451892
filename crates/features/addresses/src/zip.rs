//! Brazilian zip code (CEP) handling.
//!
//! Saving an address runs [`normalize_zip_code`] and then [`validate_zip_code`]; only a
//! [`ZipCode`] can be persisted, so a stored value always has the shape `00000-000`.

use crate::error::AddressBookError;
use serde::Serialize;
use std::fmt;

pub const ZIP_CODE_FIELD: &str = "zip_code";
pub const ZIP_CODE_FORMAT_MESSAGE: &str = "zip code must be in the format 00000-000";

const DIGITS: usize = 8;
const PREFIX: usize = 5;

/// A zip code in canonical `DDDDD-DDD` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    /// Normalizes and validates raw user input.
    ///
    /// # Errors
    /// [`AddressBookError::Format`] when the input does not reduce to eight digits in
    /// canonical form.
    pub fn parse(input: &str) -> Result<Self, AddressBookError> {
        validate_zip_code(&normalize_zip_code(input))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ZipCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rewrites input that contains exactly eight digits as `DDDDD-DDD`.
///
/// Every non-digit character is dropped before counting. Any other digit count leaves
/// the input untouched, so the validator can reject it as typed.
///
/// ```
/// use abook_addresses::normalize_zip_code;
///
/// assert_eq!(normalize_zip_code("01310100"), "01310-100");
/// assert_eq!(normalize_zip_code("01.310-100"), "01310-100");
/// assert_eq!(normalize_zip_code("123-45"), "123-45");
/// ```
#[must_use]
pub fn normalize_zip_code(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == DIGITS {
        format!("{}-{}", &digits[..PREFIX], &digits[PREFIX..])
    } else {
        input.to_owned()
    }
}

/// Accepts a value only if it is exactly `DDDDD-DDD`.
///
/// Only ASCII digits count; other Unicode digits such as `٠١٣١٠-١٠٠` are rejected.
///
/// # Errors
/// [`AddressBookError::Format`] with the message
/// `"zip code must be in the format 00000-000"`.
pub fn validate_zip_code(value: &str) -> Result<ZipCode, AddressBookError> {
    if is_canonical(value) {
        Ok(ZipCode(value.to_owned()))
    } else {
        Err(AddressBookError::Format {
            field: ZIP_CODE_FIELD.into(),
            message: ZIP_CODE_FORMAT_MESSAGE.into(),
            context: None,
        })
    }
}

fn is_canonical(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == DIGITS + 1
        && bytes[PREFIX] == b'-'
        && bytes[..PREFIX].iter().chain(&bytes[PREFIX + 1..]).all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_eight_digits() {
        assert_eq!(normalize_zip_code("01310100"), "01310-100");
        assert_eq!(normalize_zip_code(" 01310 100 "), "01310-100");
        assert_eq!(normalize_zip_code("CEP: 01310/100"), "01310-100");
    }

    #[test]
    fn canonical_input_is_unchanged() {
        assert_eq!(normalize_zip_code("01310-100"), "01310-100");
    }

    #[test]
    fn other_digit_counts_pass_through() {
        assert_eq!(normalize_zip_code(""), "");
        assert_eq!(normalize_zip_code("123-45"), "123-45");
        assert_eq!(normalize_zip_code("013101000"), "013101000");
        assert_eq!(normalize_zip_code("abc"), "abc");
    }

    #[test]
    fn validator_accepts_only_canonical_shape() {
        assert_eq!(validate_zip_code("01310-100").unwrap().as_str(), "01310-100");

        for bad in ["", "01310100", "0131-0100", "01310-10a", "01310_100", "01310-1000", "٠١٣١٠-١٠٠"] {
            let err = validate_zip_code(bad).unwrap_err();
            assert_eq!(err.field(), Some(ZIP_CODE_FIELD), "{bad}");
            assert!(err.to_string().ends_with(ZIP_CODE_FORMAT_MESSAGE), "{bad}");
        }
    }

    #[test]
    fn parse_runs_both_phases() {
        assert_eq!(ZipCode::parse("01310100").unwrap().to_string(), "01310-100");
        assert!(matches!(ZipCode::parse("123-45"), Err(AddressBookError::Format { .. })));
    }
}
