//! Entities of the address book: `State -> City -> Address`.

use crate::zip::ZipCode;
use abook_domain::constants::{ADDRESS, CITY, STATE};
use serde::Serialize;
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

pub const STATE_NAME_MAX: usize = 100;
pub const STATE_ABBREVIATION_LEN: usize = 2;
pub const CITY_NAME_MAX: usize = 100;
pub const STREET_NAME_MAX: usize = 255;
pub const NEIGHBORHOOD_MAX: usize = 255;

/// Storage and presentation metadata shared by the three entities.
pub trait Model {
    /// Table the records live in.
    const TABLE: &'static str;
    const VERBOSE_NAME: &'static str;
    const VERBOSE_NAME_PLURAL: &'static str;
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(abook_kernel::safe_nanoid!())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a [`State`].
    StateId
);
record_id!(
    /// Identifier of a [`City`].
    CityId
);
record_id!(
    /// Identifier of an [`Address`].
    AddressId
);

/// A Brazilian federative unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
    pub abbreviation: String,
}

impl Model for State {
    const TABLE: &'static str = STATE;
    const VERBOSE_NAME: &'static str = "Estado";
    const VERBOSE_NAME_PLURAL: &'static str = "Estados";
}

/// `"SP (São Paulo)"`: the abbreviation uppercased and the name title-cased.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.abbreviation.to_uppercase(), title_case(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub state: StateId,
}

impl Model for City {
    const TABLE: &'static str = CITY;
    const VERBOSE_NAME: &'static str = "Cidade";
    const VERBOSE_NAME_PLURAL: &'static str = "Cidades";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub street_suffix: StreetSuffix,
    pub street_name: String,
    pub neighborhood: String,
    pub zip_code: ZipCode,
    pub city: CityId,
}

impl Model for Address {
    const TABLE: &'static str = ADDRESS;
    const VERBOSE_NAME: &'static str = "Endereço";
    const VERBOSE_NAME_PLURAL: &'static str = "Endereços";
}

/// Street type of an address.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
)]
pub enum StreetSuffix {
    Rua,
    Avenida,
    Alameda,
    Travessa,
    #[strum(serialize = "Praça")]
    #[serde(rename = "Praça")]
    Praca,
    Largo,
    Viela,
    Estrada,
    Rodovia,
}

impl StreetSuffix {
    /// Stored and displayed value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A city together with its state, as needed to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityDetail {
    pub city: City,
    pub state: State,
}

/// `"São Paulo - SP"`. The abbreviation is used as stored, without uppercasing.
impl fmt::Display for CityDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.city.name, self.state.abbreviation)
    }
}

/// An address together with its city and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressDetail {
    pub address: Address,
    pub city: CityDetail,
}

/// `"01000-000 - Rua das Flores - Jardim das Acácias, São Paulo - SP"`.
impl fmt::Display for AddressDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = &self.address;
        write!(
            f,
            "{} - {} {} - {}, {}",
            address.zip_code,
            address.street_suffix,
            address.street_name,
            address.neighborhood,
            self.city
        )
    }
}

/// Uppercases the first letter of every word and lowercases the rest.
///
/// A letter starts a word when the character before it is not a letter, so
/// `"são paulo"` becomes `"São Paulo"` and `"d'oeste"` becomes `"D'Oeste"`.
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    out
}
