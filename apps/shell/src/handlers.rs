//! Subcommand handlers. They translate arguments into slice calls and print the results.

use crate::args::{AddressAction, AddressFields, CityAction, StateAction};
use crate::output::Output;
use abook_addresses::admin::{ADDRESS_ADMIN, CITY_ADMIN, STATE_ADMIN};
use abook_addresses::{
    Address, AddressBook, AddressDraft, AddressFilter, AddressId, City, CityDraft, CityFilter,
    CityId, Model, State, StateDraft, StateId, parse_street_suffix,
};
use anyhow::Result;

pub async fn state(book: &AddressBook, out: &Output, action: StateAction) -> Result<()> {
    match action {
        StateAction::Add { name, abbreviation, city } => {
            let draft = StateDraft::new(name, abbreviation);
            let (state, cities) = book.create_state_with_cities(draft, city).await?;
            out.record(&state.id, &state)?;
            for city in &cities {
                out.note(format_args!("  {}: {} ({})", City::VERBOSE_NAME, city.name, city.id));
            }
        },
        StateAction::List { search } => {
            let states = book.list_states(&STATE_ADMIN.list_query(search)).await?;
            out.table(State::VERBOSE_NAME_PLURAL, &STATE_ADMIN, &states)?;
        },
        StateAction::Show { id } => {
            let id = StateId::from(id);
            let state = book.get_state(&id).await?;
            out.record(&state.id, &state)?;

            let inline = STATE_ADMIN.inline.map(|i| i.list_query()).unwrap_or_default();
            let cities = book.list_cities(&inline, &CityFilter { state: Some(id) }).await?;
            out.table(City::VERBOSE_NAME_PLURAL, &CITY_ADMIN, &cities)?;
        },
        StateAction::Update { id, name, abbreviation } => {
            let state =
                book.update_state(&StateId::from(id), StateDraft::new(name, abbreviation)).await?;
            out.record(&state.id, &state)?;
        },
        StateAction::Delete { id } => {
            let report = book.delete_state(&StateId::from(id.as_str())).await?;
            out.note(format_args!(
                "Deleted {} {id} with {} cities and {} addresses",
                State::VERBOSE_NAME,
                report.cities,
                report.addresses
            ));
        },
    }
    Ok(())
}

pub async fn city(book: &AddressBook, out: &Output, action: CityAction) -> Result<()> {
    match action {
        CityAction::Add { name, state } => {
            let city = book.create_city(CityDraft::new(name, StateId::from(state))).await?;
            out.record(&city.city.id, &city)?;
        },
        CityAction::List { search, state } => {
            let filter = CityFilter { state: state.map(StateId::from) };
            let cities = book.list_cities(&CITY_ADMIN.list_query(search), &filter).await?;
            out.table(City::VERBOSE_NAME_PLURAL, &CITY_ADMIN, &cities)?;
        },
        CityAction::Show { id } => {
            let id = CityId::from(id);
            let city = book.get_city(&id).await?;
            out.record(&city.city.id, &city)?;

            let inline = CITY_ADMIN.inline.map(|i| i.list_query()).unwrap_or_default();
            let filter = AddressFilter { state: None, city: Some(id) };
            let addresses = book.list_addresses(&inline, &filter).await?;
            out.table(Address::VERBOSE_NAME_PLURAL, &ADDRESS_ADMIN, &addresses)?;
        },
        CityAction::Update { id, name, state } => {
            let city =
                book.update_city(&CityId::from(id), CityDraft::new(name, StateId::from(state))).await?;
            out.record(&city.city.id, &city)?;
        },
        CityAction::Delete { id } => {
            let report = book.delete_city(&CityId::from(id.as_str())).await?;
            out.note(format_args!(
                "Deleted {} {id} with {} addresses",
                City::VERBOSE_NAME,
                report.addresses
            ));
        },
    }
    Ok(())
}

pub async fn address(book: &AddressBook, out: &Output, action: AddressAction) -> Result<()> {
    match action {
        AddressAction::Add { fields } => {
            let address = book.create_address(draft(fields)?).await?;
            out.record(&address.address.id, &address)?;
        },
        AddressAction::List { search, state, city } => {
            let filter =
                AddressFilter { state: state.map(StateId::from), city: city.map(CityId::from) };
            let addresses = book.list_addresses(&ADDRESS_ADMIN.list_query(search), &filter).await?;
            out.table(Address::VERBOSE_NAME_PLURAL, &ADDRESS_ADMIN, &addresses)?;
        },
        AddressAction::Update { id, fields } => {
            let address = book.update_address(&AddressId::from(id), draft(fields)?).await?;
            out.record(&address.address.id, &address)?;
        },
        AddressAction::Delete { id } => {
            book.delete_address(&AddressId::from(id.as_str())).await?;
            out.note(format_args!("Deleted {} {id}", Address::VERBOSE_NAME));
        },
    }
    Ok(())
}

fn draft(fields: AddressFields) -> Result<AddressDraft> {
    Ok(AddressDraft {
        street_suffix: parse_street_suffix(&fields.suffix)?,
        street_name: fields.street,
        neighborhood: fields.neighborhood,
        zip_code: fields.zip,
        city: CityId::from(fields.city),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use abook_addresses::{AddressBookError, ListQuery, MIGRATIONS};
    use abook_database::Database;

    async fn book() -> AddressBook {
        let db = Database::builder()
            .url("mem://")
            .session("shell", "handlers")
            .migrations(MIGRATIONS.iter().copied())
            .init()
            .await
            .unwrap();
        AddressBook::new(db)
    }

    fn add(city: &[&str]) -> StateAction {
        StateAction::Add {
            name: "Bahia".to_owned(),
            abbreviation: "BA".to_owned(),
            city: city.iter().map(|c| (*c).to_owned()).collect(),
        }
    }

    #[tokio::test]
    async fn state_add_requires_its_inline_city() {
        let book = book().await;
        let out = Output::new(true);

        let err = state(&book, &out, add(&[])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AddressBookError>(),
            Some(AddressBookError::InlineCount { .. })
        ));
        assert!(book.list_states(&ListQuery::new()).await.unwrap().is_empty());

        state(&book, &out, add(&["Salvador"])).await.unwrap();
        let states = book.list_states(&ListQuery::new()).await.unwrap();
        assert_eq!(states.len(), 1);
    }
}
