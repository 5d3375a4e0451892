//! Input records and the checks run before anything is written.

use crate::error::AddressBookError;
use crate::model::{
    CITY_NAME_MAX, CityId, NEIGHBORHOOD_MAX, STATE_ABBREVIATION_LEN, STATE_NAME_MAX,
    STREET_NAME_MAX, StateId, StreetSuffix,
};
use crate::zip::{ZipCode, normalize_zip_code, validate_zip_code};
use strum::IntoEnumIterator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDraft {
    pub name: String,
    pub abbreviation: String,
}

impl StateDraft {
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self { name: name.into(), abbreviation: abbreviation.into() }
    }

    /// # Errors
    /// [`AddressBookError::Length`] for a blank or overlong name, or an abbreviation that
    /// is not exactly two characters.
    pub fn validate(&self) -> Result<(), AddressBookError> {
        check_text("name", &self.name, STATE_NAME_MAX)?;
        let len = self.abbreviation.chars().count();
        if len != STATE_ABBREVIATION_LEN {
            return Err(AddressBookError::length(
                "abbreviation",
                format!("must be exactly {STATE_ABBREVIATION_LEN} characters, got {len}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityDraft {
    pub name: String,
    pub state: StateId,
}

impl CityDraft {
    pub fn new(name: impl Into<String>, state: StateId) -> Self {
        Self { name: name.into(), state }
    }

    /// # Errors
    /// [`AddressBookError::Length`] for a blank or overlong name.
    pub fn validate(&self) -> Result<(), AddressBookError> {
        check_text("name", &self.name, CITY_NAME_MAX)
    }
}

/// Address as submitted, with the zip code still in raw form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDraft {
    pub street_suffix: StreetSuffix,
    pub street_name: String,
    pub neighborhood: String,
    pub zip_code: String,
    pub city: CityId,
}

/// Address that passed every check; its zip code is canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAddress {
    pub(crate) street_suffix: StreetSuffix,
    pub(crate) street_name: String,
    pub(crate) neighborhood: String,
    pub(crate) zip_code: ZipCode,
    pub(crate) city: CityId,
}

impl ValidAddress {
    #[must_use]
    pub const fn zip_code(&self) -> &ZipCode {
        &self.zip_code
    }

    #[must_use]
    pub const fn city(&self) -> &CityId {
        &self.city
    }
}

impl AddressDraft {
    /// Normalizes the zip code, then validates every field.
    ///
    /// # Errors
    /// * [`AddressBookError::Format`] if the zip code is not `00000-000` after normalization.
    /// * [`AddressBookError::Length`] for a blank or overlong street name or neighborhood.
    pub fn validate(self) -> Result<ValidAddress, AddressBookError> {
        let zip_code = validate_zip_code(&normalize_zip_code(&self.zip_code))?;
        check_text("street_name", &self.street_name, STREET_NAME_MAX)?;
        check_text("neighborhood", &self.neighborhood, NEIGHBORHOOD_MAX)?;

        Ok(ValidAddress {
            street_suffix: self.street_suffix,
            street_name: self.street_name,
            neighborhood: self.neighborhood,
            zip_code,
            city: self.city,
        })
    }
}

/// Parses a street suffix as typed by a user.
///
/// # Errors
/// [`AddressBookError::InvalidChoice`] listing the accepted values.
pub fn parse_street_suffix(value: &str) -> Result<StreetSuffix, AddressBookError> {
    value.trim().parse().map_err(|_| AddressBookError::InvalidChoice {
        field: "street_suffix".into(),
        message: format!("'{value}' is not one of {}", choices()).into(),
        context: None,
    })
}

fn choices() -> String {
    StreetSuffix::iter().map(StreetSuffix::as_str).collect::<Vec<_>>().join(", ")
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), AddressBookError> {
    if value.trim().is_empty() {
        return Err(AddressBookError::length(field, "must not be blank"));
    }
    let len = value.chars().count();
    if len > max {
        return Err(AddressBookError::length(
            field,
            format!("must be at most {max} characters, got {len}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(zip_code: &str) -> AddressDraft {
        AddressDraft {
            street_suffix: StreetSuffix::Avenida,
            street_name: "Paulista".to_owned(),
            neighborhood: "Bela Vista".to_owned(),
            zip_code: zip_code.to_owned(),
            city: "c1".into(),
        }
    }

    #[test]
    fn zip_code_is_normalized_before_validation() {
        let valid = draft("01310100").validate().unwrap();
        assert_eq!(valid.zip_code().as_str(), "01310-100");
    }

    #[test]
    fn malformed_zip_code_is_rejected() {
        let err = draft("123-45").validate().unwrap_err();
        assert!(matches!(err, AddressBookError::Format { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn empty_zip_code_is_a_format_error() {
        assert!(matches!(draft("").validate(), Err(AddressBookError::Format { .. })));
    }

    #[test]
    fn lengths_are_counted_in_characters() {
        let name = "ã".repeat(STATE_NAME_MAX);
        assert!(StateDraft::new(name.clone(), "SP").validate().is_ok());

        let err = StateDraft::new(format!("{name}a"), "SP").validate().unwrap_err();
        assert_eq!(err.field(), Some("name"));

        let mut long = draft("01310-100");
        long.neighborhood = "b".repeat(NEIGHBORHOOD_MAX + 1);
        assert_eq!(long.validate().unwrap_err().field(), Some("neighborhood"));
    }

    #[test]
    fn abbreviation_must_have_two_characters() {
        for bad in ["S", "SPO", ""] {
            let err = StateDraft::new("São Paulo", bad).validate().unwrap_err();
            assert_eq!(err.field(), Some("abbreviation"), "{bad}");
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = CityDraft::new("   ", "s1".into()).validate().unwrap_err();
        assert!(matches!(err, AddressBookError::Length { .. }));
    }

    #[test]
    fn street_suffix_choices() {
        assert_eq!(parse_street_suffix(" Praça ").unwrap(), StreetSuffix::Praca);
        let err = parse_street_suffix("Boulevard").unwrap_err();
        assert_eq!(err.field(), Some("street_suffix"));
    }
}
