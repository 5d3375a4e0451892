//! List parameters: field keys, sort direction, search and filters.
//!
//! Field keys are closed enums mapped to static column names, so nothing a caller
//! passes is ever spliced into a query string. Sorting happens on loaded rows so that
//! ordering by a reference can follow the referenced model's own ordering.

use crate::model::{AddressDetail, CityDetail, CityId, State, StateId};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// A listable column of an entity.
pub trait ListField: Copy + Eq + 'static {
    /// Row type the field is read from.
    type Row;

    /// Ordering used when a listing asks for none.
    const DEFAULT_ORDERING: &'static [(Self, Direction)];

    /// Stored column name.
    fn column(self) -> &'static str;

    /// Portuguese label for UI callers.
    fn label(self) -> &'static str;

    /// Display value of the field in `row`.
    fn value(self, row: &Self::Row) -> String;

    /// Ascending comparison of two rows on this field.
    fn compare(self, a: &Self::Row, b: &Self::Row) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    Name,
    Abbreviation,
}

impl ListField for StateField {
    type Row = State;

    const DEFAULT_ORDERING: &'static [(Self, Direction)] =
        &[(Self::Abbreviation, Direction::Ascending)];

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Abbreviation => "abbreviation",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Nome do Estado",
            Self::Abbreviation => "Sigla do Estado",
        }
    }

    fn value(self, row: &State) -> String {
        match self {
            Self::Name => row.name.clone(),
            Self::Abbreviation => row.abbreviation.clone(),
        }
    }

    fn compare(self, a: &State, b: &State) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Abbreviation => a.abbreviation.cmp(&b.abbreviation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CityField {
    Name,
    State,
}

impl ListField for CityField {
    type Row = CityDetail;

    const DEFAULT_ORDERING: &'static [(Self, Direction)] = &[(Self::Name, Direction::Ascending)];

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::State => "state",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Nome da Cidade",
            Self::State => "Estado",
        }
    }

    fn value(self, row: &CityDetail) -> String {
        match self {
            Self::Name => row.city.name.clone(),
            Self::State => row.state.to_string(),
        }
    }

    fn compare(self, a: &CityDetail, b: &CityDetail) -> Ordering {
        match self {
            Self::Name => a.city.name.cmp(&b.city.name),
            // same as the state default ordering
            Self::State => StateField::Abbreviation.compare(&a.state, &b.state),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    StreetSuffix,
    StreetName,
    Neighborhood,
    ZipCode,
    City,
}

impl ListField for AddressField {
    type Row = AddressDetail;

    const DEFAULT_ORDERING: &'static [(Self, Direction)] =
        &[(Self::StreetName, Direction::Ascending)];

    fn column(self) -> &'static str {
        match self {
            Self::StreetSuffix => "street_suffix",
            Self::StreetName => "street_name",
            Self::Neighborhood => "neighborhood",
            Self::ZipCode => "zip_code",
            Self::City => "city",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::StreetSuffix => "Tipo de Logradouro",
            Self::StreetName => "Endereço",
            Self::Neighborhood => "Bairro",
            Self::ZipCode => "CEP",
            Self::City => "Cidade",
        }
    }

    fn value(self, row: &AddressDetail) -> String {
        let address = &row.address;
        match self {
            Self::StreetSuffix => address.street_suffix.to_string(),
            Self::StreetName => address.street_name.clone(),
            Self::Neighborhood => address.neighborhood.clone(),
            Self::ZipCode => address.zip_code.to_string(),
            Self::City => row.city.to_string(),
        }
    }

    fn compare(self, a: &AddressDetail, b: &AddressDetail) -> Ordering {
        let (x, y) = (&a.address, &b.address);
        match self {
            Self::StreetSuffix => x.street_suffix.as_str().cmp(y.street_suffix.as_str()),
            Self::StreetName => x.street_name.cmp(&y.street_name),
            Self::Neighborhood => x.neighborhood.cmp(&y.neighborhood),
            Self::ZipCode => x.zip_code.cmp(&y.zip_code),
            // same as the city default ordering
            Self::City => CityField::Name.compare(&a.city, &b.city),
        }
    }
}

/// Search and ordering of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<F> {
    pub search: Option<String>,
    /// Sort keys applied in order; empty means the model default ordering.
    pub order: Vec<(F, Direction)>,
}

impl<F> Default for ListQuery<F> {
    fn default() -> Self {
        Self { search: None, order: Vec::new() }
    }
}

impl<F: ListField> ListQuery<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring matched against the entity's search fields.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: F, direction: Direction) -> Self {
        self.order.push((field, direction));
        self
    }

    /// Sort keys in effect.
    #[must_use]
    pub fn ordering(&self) -> &[(F, Direction)] {
        if self.order.is_empty() { F::DEFAULT_ORDERING } else { &self.order }
    }

    /// Lowercased search term, `None` when blank.
    pub(crate) fn search_term(&self) -> Option<String> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase)
    }

    /// Sorts `rows` by [`ListQuery::ordering`]. The sort is stable.
    pub fn sort(&self, rows: &mut [F::Row]) {
        let keys = self.ordering();
        rows.sort_by(|a, b| {
            keys.iter().fold(Ordering::Equal, |acc, (field, direction)| {
                acc.then_with(|| direction.apply(field.compare(a, b)))
            })
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityFilter {
    pub state: Option<StateId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFilter {
    /// Matches addresses whose city belongs to this state.
    pub state: Option<StateId>,
    pub city: Option<CityId>,
}

/// `(string::contains(string::lowercase(a), $search) OR ...)` over `fields`.
pub(crate) fn search_clause<F: ListField>(fields: &[F]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let terms: Vec<String> = fields
        .iter()
        .map(|f| format!("string::contains(string::lowercase({}), $search)", f.column()))
        .collect();
    Some(format!("({})", terms.join(" OR ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::City;

    fn state(abbreviation: &str, name: &str) -> State {
        State { id: abbreviation.into(), name: name.to_owned(), abbreviation: abbreviation.to_owned() }
    }

    fn city(name: &str, state: State) -> CityDetail {
        CityDetail {
            city: City { id: name.into(), name: name.to_owned(), state: state.id.clone() },
            state,
        }
    }

    #[test]
    fn states_default_to_abbreviation_order() {
        let mut rows = vec![state("SP", "São Paulo"), state("RJ", "Rio de Janeiro")];
        ListQuery::<StateField>::new().sort(&mut rows);
        assert_eq!(rows[0].abbreviation, "RJ");
    }

    #[test]
    fn explicit_order_overrides_default() {
        let mut rows = vec![state("AC", "Acre"), state("AL", "Alagoas"), state("AM", "Amazonas")];
        ListQuery::new().order_by(StateField::Name, Direction::Descending).sort(&mut rows);
        let names: Vec<_> = rows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Amazonas", "Alagoas", "Acre"]);
    }

    #[test]
    fn cities_sort_by_state_then_name() {
        let sp = state("SP", "São Paulo");
        let rj = state("RJ", "Rio de Janeiro");
        let mut rows = vec![city("São Paulo", sp.clone()), city("Niterói", rj), city("Campinas", sp)];

        ListQuery::<CityField>::new().sort(&mut rows);
        let names: Vec<_> = rows.iter().map(|c| c.city.name.as_str()).collect();
        assert_eq!(names, ["Campinas", "Niterói", "São Paulo"]);

        ListQuery::new()
            .order_by(CityField::State, Direction::Ascending)
            .order_by(CityField::Name, Direction::Ascending)
            .sort(&mut rows);
        let names: Vec<_> = rows.iter().map(|c| c.city.name.as_str()).collect();
        assert_eq!(names, ["Niterói", "Campinas", "São Paulo"]);
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(ListQuery::<StateField>::new().search("   ").search_term(), None);
        assert_eq!(
            ListQuery::<StateField>::new().search(" PAULO ").search_term().as_deref(),
            Some("paulo")
        );
    }

    #[test]
    fn search_clause_uses_static_columns() {
        assert_eq!(search_clause::<StateField>(&[]), None);
        assert_eq!(
            search_clause(&[StateField::Name, StateField::Abbreviation]).unwrap(),
            "(string::contains(string::lowercase(name), $search) OR \
             string::contains(string::lowercase(abbreviation), $search))"
        );
    }
}
