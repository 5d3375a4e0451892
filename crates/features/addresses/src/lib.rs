//! # Address Book
//!
//! Brazilian states, cities and street addresses stored in SurrealDB.
//!
//! * [`model`]: the `State -> City -> Address` entities, their display formats and
//!   Portuguese labels.
//! * [`zip`]: CEP normalization (`01310100` -> `01310-100`) and validation.
//! * [`validate`]: input drafts checked before every write.
//! * [`query`] and [`admin`]: parameterized listings and the admin screen descriptions.
//! * [`AddressBook`]: CRUD with cascading deletes.
//!
//! ## Example
//!
//! ```rust
//! use abook_addresses::{AddressBook, AddressDraft, CityDraft, StateDraft, StreetSuffix, MIGRATIONS};
//! use abook_database::Database;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::builder()
//!     .url("mem://")
//!     .session("abook", "addresses")
//!     .migrations(MIGRATIONS.iter().copied())
//!     .init()
//!     .await?;
//! let book = AddressBook::new(db);
//!
//! let sp = book.create_state(StateDraft::new("são paulo", "SP")).await?;
//! let city = book.create_city(CityDraft::new("São Paulo", sp.id.clone())).await?;
//! let address = book
//!     .create_address(AddressDraft {
//!         street_suffix: StreetSuffix::Avenida,
//!         street_name: "Paulista".into(),
//!         neighborhood: "Bela Vista".into(),
//!         zip_code: "01310100".into(),
//!         city: city.city.id.clone(),
//!     })
//!     .await?;
//!
//! assert_eq!(address.to_string(), "01310-100 - Avenida Paulista - Bela Vista, São Paulo - SP");
//! # Ok(())
//! # }
//! ```

pub mod admin;
mod error;
pub mod model;
pub mod query;
mod repository;
pub mod validate;
pub mod zip;

pub use crate::error::{AddressBookError, AddressBookErrorExt};
pub use crate::model::{
    Address, AddressDetail, AddressId, City, CityDetail, CityId, Model, State, StateId,
    StreetSuffix,
};
pub use crate::query::{
    AddressField, AddressFilter, CityField, CityFilter, Direction, ListField, ListQuery,
    StateField,
};
pub use crate::repository::{AddressBook, CascadeReport};
pub use crate::validate::{AddressDraft, CityDraft, StateDraft, parse_street_suffix};
pub use crate::zip::{ZipCode, normalize_zip_code, validate_zip_code};

use abook_database::Migration;
use abook_domain::constants::ADDRESSES_SLICE;

/// Schema migrations of this slice, in application order.
pub const MIGRATIONS: &[Migration] =
    &[Migration::new(ADDRESSES_SLICE, "0001", include_str!("../migrations/0001_init.surql"))];
