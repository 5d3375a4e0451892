//! Management screens of the three entities, described as data.

use crate::error::AddressBookError;
use crate::query::{AddressField, CityField, Direction, ListField, ListQuery, StateField};

/// Filters offered next to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    State,
    City,
}

impl FilterKey {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "Estado",
            Self::City => "Cidade",
        }
    }
}

/// Child rows edited together with their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineSpec<F: 'static> {
    /// Blank rows offered beyond the existing ones.
    pub extra: u32,
    pub min_num: u32,
    /// `None` means unbounded.
    pub max_num: Option<u32>,
    pub ordering: &'static [(F, Direction)],
}

impl<F: ListField> InlineSpec<F> {
    /// Checks the number of rows submitted with a parent.
    ///
    /// # Errors
    /// [`AddressBookError::InlineCount`] when `count` is outside `min_num..=max_num`.
    pub fn validate_count(&self, count: usize) -> Result<(), AddressBookError> {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        if count < self.min_num {
            return Err(AddressBookError::InlineCount {
                message: format!("at least {} required, got {count}", self.min_num).into(),
                context: None,
            });
        }
        if let Some(max) = self.max_num
            && count > max
        {
            return Err(AddressBookError::InlineCount {
                message: format!("at most {max} allowed, got {count}").into(),
                context: None,
            });
        }
        Ok(())
    }

    /// Listing of the inline rows in their admin order.
    #[must_use]
    pub fn list_query(&self) -> ListQuery<F> {
        ListQuery { search: None, order: self.ordering.to_vec() }
    }
}

/// Listing, search, filter and inline configuration of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelAdmin<F: 'static, I: 'static = F> {
    pub list_display: &'static [F],
    pub search_fields: &'static [F],
    pub list_filter: &'static [FilterKey],
    pub ordering: &'static [(F, Direction)],
    pub inline: Option<InlineSpec<I>>,
}

impl<F: ListField, I: 'static> ModelAdmin<F, I> {
    /// Admin listing with an optional search term.
    #[must_use]
    pub fn list_query(&self, search: Option<String>) -> ListQuery<F> {
        ListQuery { search, order: self.ordering.to_vec() }
    }

    /// Column headers of the listing.
    #[must_use]
    pub fn headers(&self) -> Vec<&'static str> {
        self.list_display.iter().map(|f| f.label()).collect()
    }

    /// One listing row rendered with the display columns.
    #[must_use]
    pub fn row(&self, row: &F::Row) -> Vec<String> {
        self.list_display.iter().map(|f| f.value(row)).collect()
    }
}

pub const STATE_ADMIN: ModelAdmin<StateField, CityField> = ModelAdmin {
    list_display: &[StateField::Name, StateField::Abbreviation],
    search_fields: &[StateField::Name, StateField::Abbreviation],
    list_filter: &[],
    ordering: &[(StateField::Abbreviation, Direction::Ascending)],
    inline: Some(InlineSpec {
        extra: 1,
        min_num: 1,
        max_num: Some(1),
        ordering: &[(CityField::State, Direction::Ascending), (CityField::Name, Direction::Ascending)],
    }),
};

pub const CITY_ADMIN: ModelAdmin<CityField, AddressField> = ModelAdmin {
    list_display: &[CityField::Name, CityField::State],
    search_fields: &[CityField::Name],
    list_filter: &[FilterKey::State],
    ordering: &[(CityField::State, Direction::Ascending), (CityField::Name, Direction::Ascending)],
    inline: Some(InlineSpec {
        extra: 1,
        min_num: 0,
        max_num: None,
        ordering: &[
            (AddressField::ZipCode, Direction::Ascending),
            (AddressField::City, Direction::Ascending),
            (AddressField::StreetName, Direction::Ascending),
        ],
    }),
};

pub const ADDRESS_ADMIN: ModelAdmin<AddressField> = ModelAdmin {
    list_display: &[
        AddressField::StreetSuffix,
        AddressField::StreetName,
        AddressField::Neighborhood,
        AddressField::ZipCode,
        AddressField::City,
    ],
    search_fields: &[AddressField::StreetName, AddressField::Neighborhood, AddressField::ZipCode],
    list_filter: &[FilterKey::State, FilterKey::City],
    ordering: &[
        (AddressField::ZipCode, Direction::Ascending),
        (AddressField::City, Direction::Ascending),
        (AddressField::StreetName, Direction::Ascending),
    ],
    inline: None,
};
