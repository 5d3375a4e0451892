//! SurrealDB storage of the address book.
//!
//! Every write validates its input first and checks that referenced parents exist, so a
//! rejected operation leaves stored data untouched. Deletes cascade down the
//! `State -> City -> Address` tree inside a single transaction.

use crate::admin::{ADDRESS_ADMIN, CITY_ADMIN, STATE_ADMIN};
use crate::error::{AddressBookError, AddressBookErrorExt};
use crate::model::{
    Address, AddressDetail, AddressId, City, CityDetail, CityId, State, StateId, StreetSuffix,
};
use crate::query::{
    AddressField, AddressFilter, CityField, CityFilter, ListQuery, StateField, search_clause,
};
use crate::validate::{AddressDraft, CityDraft, StateDraft, ValidAddress};
use crate::zip::validate_zip_code;
use abook_database::Database;
use abook_domain::constants::{ADDRESS, CITY, STATE};
use fxhash::FxHashMap;
use surrealdb::types::SurrealValue;
use tracing::{debug, info, instrument};

const STATE_COLUMNS: &str = "uid, name, abbreviation";
const CITY_COLUMNS: &str = "uid, name, state";
const ADDRESS_COLUMNS: &str = "uid, street_suffix, street_name, neighborhood, zip_code, city";

/// Thrown inside a write transaction when a referenced parent row is gone.
const MISSING_PARENT: &str = "abook: referenced parent is gone";
/// Thrown inside a write transaction when the updated row is gone.
const MISSING_RECORD: &str = "abook: updated record is gone";

#[derive(Debug, SurrealValue)]
struct StateRow {
    uid: String,
    name: String,
    abbreviation: String,
}

impl From<StateRow> for State {
    fn from(row: StateRow) -> Self {
        Self { id: row.uid.into(), name: row.name, abbreviation: row.abbreviation }
    }
}

#[derive(Debug, SurrealValue)]
struct CityRow {
    uid: String,
    name: String,
    state: String,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        Self { id: row.uid.into(), name: row.name, state: row.state.into() }
    }
}

#[derive(Debug, SurrealValue)]
struct AddressRow {
    uid: String,
    street_suffix: String,
    street_name: String,
    neighborhood: String,
    zip_code: String,
    city: String,
}

impl TryFrom<AddressRow> for Address {
    type Error = AddressBookError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let street_suffix = row.street_suffix.parse::<StreetSuffix>().map_err(|_| {
            AddressBookError::Internal {
                message: format!("stored street suffix '{}' is unknown", row.street_suffix).into(),
                context: Some(format!("Reading address {}", row.uid).into()),
            }
        })?;
        let zip_code = validate_zip_code(&row.zip_code)
            .context(format!("Reading address {}", row.uid))?;

        Ok(Self {
            id: row.uid.into(),
            street_suffix,
            street_name: row.street_name,
            neighborhood: row.neighborhood,
            zip_code,
            city: row.city.into(),
        })
    }
}

/// Records removed by a cascading delete, besides the target itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub cities: usize,
    pub addresses: usize,
}

/// Address book storage on top of a migrated [`Database`].
#[derive(Debug, Clone)]
pub struct AddressBook {
    db: Database,
}

impl AddressBook {
    /// Wraps a connection on which [`crate::MIGRATIONS`] have been applied.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    // States

    /// # Errors
    /// [`AddressBookError::Length`] for invalid fields; storage errors otherwise.
    #[instrument(skip(self))]
    pub async fn create_state(&self, draft: StateDraft) -> Result<State, AddressBookError> {
        draft.validate()?;
        let state = to_state(StateId::generate(), draft);

        self.db
            .query(format!(
                "CREATE {STATE} CONTENT {{ uid: $uid, name: $name, abbreviation: $abbreviation }}"
            ))
            .bind(("uid", state.id.as_str().to_owned()))
            .bind(("name", state.name.clone()))
            .bind(("abbreviation", state.abbreviation.clone()))
            .await
            .context("Creating state")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Creating state")?;

        info!(id = %state.id, state = %state, "State created");
        Ok(state)
    }

    /// Creates a state together with its inline cities in one transaction.
    ///
    /// The number of cities must satisfy the state admin inline (exactly one).
    ///
    /// # Errors
    /// [`AddressBookError::InlineCount`] for a wrong number of cities, validation errors
    /// for any invalid field; nothing is written in either case.
    #[instrument(skip(self))]
    pub async fn create_state_with_cities(
        &self,
        draft: StateDraft,
        cities: Vec<String>,
    ) -> Result<(State, Vec<City>), AddressBookError> {
        if let Some(inline) = STATE_ADMIN.inline {
            inline.validate_count(cities.len()).context("Cities of a new state")?;
        }
        draft.validate()?;
        let state = to_state(StateId::generate(), draft);

        let mut created = Vec::with_capacity(cities.len());
        for name in cities {
            CityDraft::new(name.clone(), state.id.clone()).validate()?;
            created.push(City { id: CityId::generate(), name, state: state.id.clone() });
        }

        let mut sql = format!(
            "BEGIN TRANSACTION;\n\
             CREATE {STATE} CONTENT {{ uid: $uid, name: $name, abbreviation: $abbreviation }};\n"
        );
        for index in 0..created.len() {
            sql.push_str(&format!(
                "CREATE {CITY} CONTENT {{ \
                 uid: $city_uid_{index}, name: $city_name_{index}, state: $uid }};\n"
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut request = self
            .db
            .query(sql)
            .bind(("uid", state.id.as_str().to_owned()))
            .bind(("name", state.name.clone()))
            .bind(("abbreviation", state.abbreviation.clone()));
        for (index, city) in created.iter().enumerate() {
            request = request
                .bind((format!("city_uid_{index}"), city.id.as_str().to_owned()))
                .bind((format!("city_name_{index}"), city.name.clone()));
        }
        request
            .await
            .context("Creating state with cities")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Creating state with cities")?;

        info!(id = %state.id, state = %state, cities = created.len(), "State created");
        Ok((state, created))
    }

    /// # Errors
    /// [`AddressBookError::NotFound`] when no state has this id.
    pub async fn get_state(&self, id: &StateId) -> Result<State, AddressBookError> {
        self.find_state(id).await?.ok_or_else(|| AddressBookError::not_found("state", id.as_str()))
    }

    /// Replaces the fields of an existing state.
    ///
    /// # Errors
    /// Validation errors as for [`AddressBook::create_state`], [`AddressBookError::NotFound`]
    /// for an unknown id.
    #[instrument(skip(self))]
    pub async fn update_state(
        &self,
        id: &StateId,
        draft: StateDraft,
    ) -> Result<State, AddressBookError> {
        draft.validate()?;

        let sql = transaction(&[updated(
            &format!(
                "UPDATE {STATE} SET name = $name, abbreviation = $abbreviation WHERE uid = $uid"
            ),
            MISSING_RECORD,
        )]);
        let outcome = self
            .db
            .query(sql)
            .bind(("uid", id.as_str().to_owned()))
            .bind(("name", draft.name.clone()))
            .bind(("abbreviation", draft.abbreviation.clone()))
            .await
            .and_then(|response| response.check().map_err(surrealdb::Error::from))
            .map(drop);
        written(outcome, "Updating state", None, Some(("state", id.as_str())))?;

        let state = to_state(id.clone(), draft);
        info!(id = %state.id, state = %state, "State updated");
        Ok(state)
    }

    /// Deletes a state, its cities and their addresses.
    ///
    /// # Errors
    /// [`AddressBookError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_state(&self, id: &StateId) -> Result<CascadeReport, AddressBookError> {
        let sql = transaction(&[
            deleted(&format!(
                "DELETE {ADDRESS} WHERE city IN (SELECT VALUE uid FROM {CITY} WHERE state = $uid)"
            )),
            deleted(&format!("DELETE {CITY} WHERE state = $uid")),
            deleted(&format!("DELETE {STATE} WHERE uid = $uid")),
        ]);
        let mut response = self
            .db
            .query(sql)
            .bind(("uid", id.as_str().to_owned()))
            .await
            .context("Deleting state")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Deleting state")?;
        let addresses: Vec<String> = response.take(0).context("Deleting state")?;
        let cities: Vec<String> = response.take(1).context("Deleting state")?;
        let states: Vec<String> = response.take(2).context("Deleting state")?;
        if states.is_empty() {
            return Err(AddressBookError::not_found("state", id.as_str()));
        }

        let report = CascadeReport { cities: cities.len(), addresses: addresses.len() };
        info!(id = %id, cities = report.cities, addresses = report.addresses, "State deleted");
        Ok(report)
    }

    /// States matching the search over the admin search fields, sorted by `query`.
    ///
    /// # Errors
    /// Storage errors only.
    #[instrument(skip(self))]
    pub async fn list_states(
        &self,
        query: &ListQuery<StateField>,
    ) -> Result<Vec<State>, AddressBookError> {
        let search = query.search_term();
        let mut conditions = Vec::new();
        if search.is_some() {
            conditions.extend(search_clause(STATE_ADMIN.search_fields));
        }

        let mut request = self
            .db
            .query(format!("SELECT {STATE_COLUMNS} FROM {STATE}{}", where_sql(&conditions)));
        if let Some(term) = search {
            request = request.bind(("search", term));
        }
        let rows: Vec<StateRow> =
            request.await.context("Listing states")?.take(0).context("Listing states")?;

        let mut states: Vec<State> = rows.into_iter().map(State::from).collect();
        query.sort(&mut states);
        debug!(count = states.len(), "States listed");
        Ok(states)
    }

    // Cities

    /// # Errors
    /// [`AddressBookError::Length`] for an invalid name, [`AddressBookError::Integrity`]
    /// when the state does not exist.
    #[instrument(skip(self))]
    pub async fn create_city(&self, draft: CityDraft) -> Result<CityDetail, AddressBookError> {
        draft.validate()?;
        let state = self.parent_state(&draft.state).await?;
        let city = City { id: CityId::generate(), name: draft.name, state: draft.state };

        let sql = transaction(&[
            parent(STATE, "state"),
            format!("CREATE {CITY} CONTENT {{ uid: $uid, name: $name, state: $state }}"),
        ]);
        let outcome = self
            .db
            .query(sql)
            .bind(("uid", city.id.as_str().to_owned()))
            .bind(("name", city.name.clone()))
            .bind(("state", city.state.as_str().to_owned()))
            .await
            .and_then(|response| response.check().map_err(surrealdb::Error::from))
            .map(drop);
        written(outcome, "Creating city", Some(("state", city.state.as_str())), None)?;

        let detail = CityDetail { city, state };
        info!(id = %detail.city.id, city = %detail, "City created");
        Ok(detail)
    }

    /// # Errors
    /// [`AddressBookError::NotFound`] when no city has this id.
    pub async fn get_city(&self, id: &CityId) -> Result<CityDetail, AddressBookError> {
        let city = self
            .find_city(id)
            .await?
            .ok_or_else(|| AddressBookError::not_found("city", id.as_str()))?;
        let state = self.get_state(&city.state).await.context(format!("State of city {id}"))?;
        Ok(CityDetail { city, state })
    }

    /// # Errors
    /// Validation errors as for [`AddressBook::create_city`], [`AddressBookError::NotFound`]
    /// for an unknown id.
    #[instrument(skip(self))]
    pub async fn update_city(
        &self,
        id: &CityId,
        draft: CityDraft,
    ) -> Result<CityDetail, AddressBookError> {
        draft.validate()?;
        let state = self.parent_state(&draft.state).await?;

        let sql = transaction(&[
            parent(STATE, "state"),
            updated(
                &format!("UPDATE {CITY} SET name = $name, state = $state WHERE uid = $uid"),
                MISSING_RECORD,
            ),
        ]);
        let outcome = self
            .db
            .query(sql)
            .bind(("uid", id.as_str().to_owned()))
            .bind(("name", draft.name.clone()))
            .bind(("state", draft.state.as_str().to_owned()))
            .await
            .and_then(|response| response.check().map_err(surrealdb::Error::from))
            .map(drop);
        written(
            outcome,
            "Updating city",
            Some(("state", draft.state.as_str())),
            Some(("city", id.as_str())),
        )?;

        let city = City { id: id.clone(), name: draft.name, state: draft.state };
        let detail = CityDetail { city, state };
        info!(id = %id, city = %detail, "City updated");
        Ok(detail)
    }

    /// Deletes a city and its addresses.
    ///
    /// # Errors
    /// [`AddressBookError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_city(&self, id: &CityId) -> Result<CascadeReport, AddressBookError> {
        let sql = transaction(&[
            deleted(&format!("DELETE {ADDRESS} WHERE city = $uid")),
            deleted(&format!("DELETE {CITY} WHERE uid = $uid")),
        ]);
        let mut response = self
            .db
            .query(sql)
            .bind(("uid", id.as_str().to_owned()))
            .await
            .context("Deleting city")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Deleting city")?;
        let addresses: Vec<String> = response.take(0).context("Deleting city")?;
        let cities: Vec<String> = response.take(1).context("Deleting city")?;
        if cities.is_empty() {
            return Err(AddressBookError::not_found("city", id.as_str()));
        }

        let report = CascadeReport { cities: 0, addresses: addresses.len() };
        info!(id = %id, addresses = report.addresses, "City deleted");
        Ok(report)
    }

    /// # Errors
    /// Storage errors only.
    #[instrument(skip(self))]
    pub async fn list_cities(
        &self,
        query: &ListQuery<CityField>,
        filter: &CityFilter,
    ) -> Result<Vec<CityDetail>, AddressBookError> {
        let search = query.search_term();
        let mut conditions = Vec::new();
        if filter.state.is_some() {
            conditions.push("state = $state".to_owned());
        }
        if search.is_some() {
            conditions.extend(search_clause(CITY_ADMIN.search_fields));
        }

        let mut request =
            self.db.query(format!("SELECT {CITY_COLUMNS} FROM {CITY}{}", where_sql(&conditions)));
        if let Some(state) = &filter.state {
            request = request.bind(("state", state.as_str().to_owned()));
        }
        if let Some(term) = search {
            request = request.bind(("search", term));
        }
        let rows: Vec<CityRow> =
            request.await.context("Listing cities")?.take(0).context("Listing cities")?;

        let mut cities = self.city_details(rows.into_iter().map(City::from).collect()).await?;
        query.sort(&mut cities);
        debug!(count = cities.len(), "Cities listed");
        Ok(cities)
    }

    // Addresses

    /// Normalizes and validates the draft, then stores it.
    ///
    /// # Errors
    /// * [`AddressBookError::Format`] for a zip code that is not `00000-000` after
    ///   normalization.
    /// * [`AddressBookError::Length`] for blank or overlong text.
    /// * [`AddressBookError::Integrity`] when the city does not exist.
    #[instrument(skip(self))]
    pub async fn create_address(
        &self,
        draft: AddressDraft,
    ) -> Result<AddressDetail, AddressBookError> {
        let valid = draft.validate()?;
        let city = self.parent_city(valid.city()).await?;
        let address = to_address(AddressId::generate(), valid);

        let sql = transaction(&[
            parent(CITY, "city"),
            format!(
                "CREATE {ADDRESS} CONTENT {{
                    uid: $uid,
                    street_suffix: $street_suffix,
                    street_name: $street_name,
                    neighborhood: $neighborhood,
                    zip_code: $zip_code,
                    city: $city
                }}"
            ),
        ]);
        let outcome = self
            .db
            .query(sql)
            .bind(("uid", address.id.as_str().to_owned()))
            .bind(("street_suffix", address.street_suffix.as_str().to_owned()))
            .bind(("street_name", address.street_name.clone()))
            .bind(("neighborhood", address.neighborhood.clone()))
            .bind(("zip_code", address.zip_code.as_str().to_owned()))
            .bind(("city", address.city.as_str().to_owned()))
            .await
            .and_then(|response| response.check().map_err(surrealdb::Error::from))
            .map(drop);
        written(outcome, "Creating address", Some(("city", address.city.as_str())), None)?;

        let detail = AddressDetail { address, city };
        info!(id = %detail.address.id, address = %detail, "Address created");
        Ok(detail)
    }

    /// # Errors
    /// [`AddressBookError::NotFound`] when no address has this id.
    pub async fn get_address(&self, id: &AddressId) -> Result<AddressDetail, AddressBookError> {
        let mut response = self
            .db
            .query(format!("SELECT {ADDRESS_COLUMNS} FROM {ADDRESS} WHERE uid = $uid"))
            .bind(("uid", id.as_str().to_owned()))
            .await
            .context("Loading address")?;
        let rows: Vec<AddressRow> = response.take(0).context("Loading address")?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AddressBookError::not_found("address", id.as_str()))?;

        let address = Address::try_from(row)?;
        let city = self.get_city(&address.city).await.context(format!("City of address {id}"))?;
        Ok(AddressDetail { address, city })
    }

    /// Reruns the full save pipeline and replaces the stored fields.
    ///
    /// # Errors
    /// Validation errors as for [`AddressBook::create_address`],
    /// [`AddressBookError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn update_address(
        &self,
        id: &AddressId,
        draft: AddressDraft,
    ) -> Result<AddressDetail, AddressBookError> {
        let valid = draft.validate()?;
        let city = self.parent_city(valid.city()).await?;
        let address = to_address(id.clone(), valid);

        let sql = transaction(&[
            parent(CITY, "city"),
            updated(
                &format!(
                    "UPDATE {ADDRESS} SET
                        street_suffix = $street_suffix,
                        street_name = $street_name,
                        neighborhood = $neighborhood,
                        zip_code = $zip_code,
                        city = $city
                    WHERE uid = $uid"
                ),
                MISSING_RECORD,
            ),
        ]);
        let outcome = self
            .db
            .query(sql)
            .bind(("uid", id.as_str().to_owned()))
            .bind(("street_suffix", address.street_suffix.as_str().to_owned()))
            .bind(("street_name", address.street_name.clone()))
            .bind(("neighborhood", address.neighborhood.clone()))
            .bind(("zip_code", address.zip_code.as_str().to_owned()))
            .bind(("city", address.city.as_str().to_owned()))
            .await
            .and_then(|response| response.check().map_err(surrealdb::Error::from))
            .map(drop);
        written(
            outcome,
            "Updating address",
            Some(("city", address.city.as_str())),
            Some(("address", id.as_str())),
        )?;

        let detail = AddressDetail { address, city };
        info!(id = %id, address = %detail, "Address updated");
        Ok(detail)
    }

    /// # Errors
    /// [`AddressBookError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: &AddressId) -> Result<(), AddressBookError> {
        let mut response = self
            .db
            .query(deleted(&format!("DELETE {ADDRESS} WHERE uid = $uid")))
            .bind(("uid", id.as_str().to_owned()))
            .await
            .context("Deleting address")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Deleting address")?;
        let deleted: Vec<String> = response.take(0).context("Deleting address")?;
        if deleted.is_empty() {
            return Err(AddressBookError::not_found("address", id.as_str()));
        }

        info!(id = %id, "Address deleted");
        Ok(())
    }

    /// # Errors
    /// Storage errors only.
    #[instrument(skip(self))]
    pub async fn list_addresses(
        &self,
        query: &ListQuery<AddressField>,
        filter: &AddressFilter,
    ) -> Result<Vec<AddressDetail>, AddressBookError> {
        let search = query.search_term();
        let mut conditions = Vec::new();
        if filter.state.is_some() {
            conditions.push(format!("city IN (SELECT VALUE uid FROM {CITY} WHERE state = $state)"));
        }
        if filter.city.is_some() {
            conditions.push("city = $city".to_owned());
        }
        if search.is_some() {
            conditions.extend(search_clause(ADDRESS_ADMIN.search_fields));
        }

        let mut request = self
            .db
            .query(format!("SELECT {ADDRESS_COLUMNS} FROM {ADDRESS}{}", where_sql(&conditions)));
        if let Some(state) = &filter.state {
            request = request.bind(("state", state.as_str().to_owned()));
        }
        if let Some(city) = &filter.city {
            request = request.bind(("city", city.as_str().to_owned()));
        }
        if let Some(term) = search {
            request = request.bind(("search", term));
        }
        let rows: Vec<AddressRow> =
            request.await.context("Listing addresses")?.take(0).context("Listing addresses")?;
        let addresses = rows.into_iter().map(Address::try_from).collect::<Result<Vec<_>, _>>()?;

        let city_ids: Vec<CityId> = addresses.iter().map(|a| a.city.clone()).collect();
        let cities: FxHashMap<CityId, CityDetail> = self
            .city_details(self.cities_by_id(&city_ids).await?)
            .await?
            .into_iter()
            .map(|detail| (detail.city.id.clone(), detail))
            .collect();

        let mut details = addresses
            .into_iter()
            .map(|address| {
                let city = cities.get(&address.city).cloned().ok_or_else(|| {
                    AddressBookError::Internal {
                        message: format!(
                            "city {} of address {} is missing",
                            address.city, address.id
                        )
                        .into(),
                        context: Some("Listing addresses".into()),
                    }
                })?;
                Ok(AddressDetail { address, city })
            })
            .collect::<Result<Vec<_>, AddressBookError>>()?;

        query.sort(&mut details);
        debug!(count = details.len(), "Addresses listed");
        Ok(details)
    }

    // Lookups

    async fn find_state(&self, id: &StateId) -> Result<Option<State>, AddressBookError> {
        let mut response = self
            .db
            .query(format!("SELECT {STATE_COLUMNS} FROM {STATE} WHERE uid = $uid"))
            .bind(("uid", id.as_str().to_owned()))
            .await
            .context("Loading state")?;
        let rows: Vec<StateRow> = response.take(0).context("Loading state")?;
        Ok(rows.into_iter().next().map(State::from))
    }

    async fn find_city(&self, id: &CityId) -> Result<Option<City>, AddressBookError> {
        let mut response = self
            .db
            .query(format!("SELECT {CITY_COLUMNS} FROM {CITY} WHERE uid = $uid"))
            .bind(("uid", id.as_str().to_owned()))
            .await
            .context("Loading city")?;
        let rows: Vec<CityRow> = response.take(0).context("Loading city")?;
        Ok(rows.into_iter().next().map(City::from))
    }

    async fn parent_state(&self, id: &StateId) -> Result<State, AddressBookError> {
        self.find_state(id).await?.ok_or_else(|| AddressBookError::integrity("state", id.as_str()))
    }

    async fn parent_city(&self, id: &CityId) -> Result<CityDetail, AddressBookError> {
        let city = self
            .find_city(id)
            .await?
            .ok_or_else(|| AddressBookError::integrity("city", id.as_str()))?;
        let state = self.get_state(&city.state).await.context(format!("State of city {id}"))?;
        Ok(CityDetail { city, state })
    }

    async fn cities_by_id(&self, ids: &[CityId]) -> Result<Vec<City>, AddressBookError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uids: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();
        let mut response = self
            .db
            .query(format!("SELECT {CITY_COLUMNS} FROM {CITY} WHERE uid IN $uids"))
            .bind(("uids", uids))
            .await
            .context("Loading cities")?;
        let rows: Vec<CityRow> = response.take(0).context("Loading cities")?;
        Ok(rows.into_iter().map(City::from).collect())
    }

    /// Pairs every city with its state.
    async fn city_details(&self, cities: Vec<City>) -> Result<Vec<CityDetail>, AddressBookError> {
        if cities.is_empty() {
            return Ok(Vec::new());
        }
        let uids: Vec<String> = cities.iter().map(|c| c.state.as_str().to_owned()).collect();
        let mut response = self
            .db
            .query(format!("SELECT {STATE_COLUMNS} FROM {STATE} WHERE uid IN $uids"))
            .bind(("uids", uids))
            .await
            .context("Loading states")?;
        let rows: Vec<StateRow> = response.take(0).context("Loading states")?;
        let states: FxHashMap<StateId, State> =
            rows.into_iter().map(State::from).map(|s| (s.id.clone(), s)).collect();

        cities
            .into_iter()
            .map(|city| {
                let state = states.get(&city.state).cloned().ok_or_else(|| {
                    AddressBookError::Internal {
                        message: format!("state {} of city {} is missing", city.state, city.id)
                            .into(),
                        context: Some("Loading cities".into()),
                    }
                })?;
                Ok(CityDetail { city, state })
            })
            .collect()
    }
}

fn to_state(id: StateId, draft: StateDraft) -> State {
    State { id, name: draft.name, abbreviation: draft.abbreviation }
}

fn to_address(id: AddressId, valid: ValidAddress) -> Address {
    Address {
        id,
        street_suffix: valid.street_suffix,
        street_name: valid.street_name,
        neighborhood: valid.neighborhood,
        zip_code: valid.zip_code,
        city: valid.city,
    }
}

/// Wraps `statements` in one transaction. `BEGIN` and `COMMIT` yield no results, so
/// result indexes match `statements`.
fn transaction(statements: &[String]) -> String {
    let mut sql = String::from("BEGIN TRANSACTION;\n");
    for statement in statements {
        sql.push_str(statement);
        sql.push_str(";\n");
    }
    sql.push_str("COMMIT TRANSACTION;");
    sql
}

/// Throws [`MISSING_PARENT`] unless `table` holds the row bound to `$param`.
///
/// The check rewrites that row unchanged, so a concurrent delete of the parent conflicts
/// with the enclosing transaction instead of committing next to it.
fn parent(table: &str, param: &str) -> String {
    updated(&format!("UPDATE {table} SET name = name WHERE uid = ${param}"), MISSING_PARENT)
}

/// Runs an `UPDATE` and throws `marker` when it matched no row.
fn updated(update: &str, marker: &str) -> String {
    format!("IF array::len(({update})) == 0 {{ THROW \"{marker}\" }}")
}

/// Runs a `DELETE` and yields the uids of the removed rows.
fn deleted(delete: &str) -> String {
    format!("SELECT VALUE uid FROM ({delete} RETURN BEFORE)")
}

/// Maps the markers thrown by [`parent`] and [`updated`] back onto slice errors.
fn written(
    outcome: Result<(), surrealdb::Error>,
    action: &'static str,
    parent: Option<(&'static str, &str)>,
    target: Option<(&'static str, &str)>,
) -> Result<(), AddressBookError> {
    let Err(err) = outcome else {
        return Ok(());
    };
    let message = err.to_string();
    if let Some((what, uid)) = parent.filter(|_| message.contains(MISSING_PARENT)) {
        return Err(AddressBookError::integrity(what, uid));
    }
    if let Some((what, uid)) = target.filter(|_| message.contains(MISSING_RECORD)) {
        return Err(AddressBookError::not_found(what, uid));
    }
    Err::<(), _>(err).context(action)
}

fn where_sql(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}
