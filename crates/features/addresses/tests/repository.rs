use abook_addresses::*;
use abook_database::Database;

async fn book() -> AddressBook {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .migrations(MIGRATIONS.iter().copied())
        .init()
        .await
        .expect("connect to mem://");
    AddressBook::new(db)
}

async fn state(book: &AddressBook, name: &str, abbreviation: &str) -> State {
    book.create_state(StateDraft::new(name, abbreviation)).await.expect("create state")
}

async fn city(book: &AddressBook, name: &str, state: &State) -> CityDetail {
    book.create_city(CityDraft::new(name, state.id.clone())).await.expect("create city")
}

fn draft(street_name: &str, zip_code: &str, city: &CityDetail) -> AddressDraft {
    AddressDraft {
        street_suffix: StreetSuffix::Rua,
        street_name: street_name.to_owned(),
        neighborhood: "Centro".to_owned(),
        zip_code: zip_code.to_owned(),
        city: city.city.id.clone(),
    }
}

#[tokio::test]
async fn saving_normalizes_zip_code() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let sao_paulo = city(&book, "São Paulo", &sp).await;

    let created = book.create_address(draft("Augusta", "01310100", &sao_paulo)).await.unwrap();
    assert_eq!(created.address.zip_code.as_str(), "01310-100");

    let stored = book.get_address(&created.address.id).await.unwrap();
    assert_eq!(stored.address.zip_code.as_str(), "01310-100");
}

#[tokio::test]
async fn malformed_zip_code_is_never_stored() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let sao_paulo = city(&book, "São Paulo", &sp).await;

    let err = book.create_address(draft("Augusta", "123-45", &sao_paulo)).await.unwrap_err();
    assert!(matches!(err, AddressBookError::Format { .. }));
    assert!(err.to_string().contains("zip code must be in the format 00000-000"));

    let all = book.list_addresses(&ListQuery::new(), &AddressFilter::default()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn displays_embed_parents() {
    let book = book().await;
    let sp = state(&book, "são paulo", "sp").await;
    assert_eq!(sp.to_string(), "SP (São Paulo)");

    let sao_paulo = city(&book, "São Paulo", &sp).await;
    assert_eq!(sao_paulo.to_string(), "São Paulo - sp");

    let mut flores = draft("das Flores", "01000-000", &sao_paulo);
    flores.neighborhood = "Jardim das Acácias".to_owned();
    let address = book.create_address(flores).await.unwrap();
    assert_eq!(address.to_string(), "01000-000 - Rua das Flores - Jardim das Acácias, São Paulo - sp");
}

#[tokio::test]
async fn default_ordering() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let rj = state(&book, "Rio de Janeiro", "RJ").await;
    let sao_paulo = city(&book, "São Paulo", &sp).await;
    city(&book, "Campinas", &sp).await;
    city(&book, "Niterói", &rj).await;
    book.create_address(draft("das Flores", "01000-000", &sao_paulo)).await.unwrap();
    book.create_address(draft("Paulista", "01310-100", &sao_paulo)).await.unwrap();

    let states = book.list_states(&ListQuery::new()).await.unwrap();
    let abbreviations: Vec<_> = states.iter().map(|s| s.abbreviation.as_str()).collect();
    assert_eq!(abbreviations, ["RJ", "SP"]);

    let cities = book.list_cities(&ListQuery::new(), &CityFilter::default()).await.unwrap();
    let names: Vec<_> = cities.iter().map(|c| c.city.name.as_str()).collect();
    assert_eq!(names, ["Campinas", "Niterói", "São Paulo"]);

    let addresses = book.list_addresses(&ListQuery::new(), &AddressFilter::default()).await.unwrap();
    let streets: Vec<_> = addresses.iter().map(|a| a.address.street_name.as_str()).collect();
    assert_eq!(streets, ["Paulista", "das Flores"]);
}

#[tokio::test]
async fn deleting_a_state_cascades() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let rj = state(&book, "Rio de Janeiro", "RJ").await;
    let sao_paulo = city(&book, "São Paulo", &sp).await;
    let campinas = city(&book, "Campinas", &sp).await;
    let niteroi = city(&book, "Niterói", &rj).await;
    book.create_address(draft("Augusta", "01310-100", &sao_paulo)).await.unwrap();
    book.create_address(draft("Barão de Jaguara", "13015-001", &campinas)).await.unwrap();
    book.create_address(draft("Moreira César", "24230-050", &niteroi)).await.unwrap();

    let report = book.delete_state(&sp.id).await.unwrap();
    assert_eq!(report, CascadeReport { cities: 2, addresses: 2 });

    let cities = book.list_cities(&ListQuery::new(), &CityFilter::default()).await.unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].city.id, niteroi.city.id);

    let addresses = book.list_addresses(&ListQuery::new(), &AddressFilter::default()).await.unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].city.city.id, niteroi.city.id);

    assert!(matches!(book.get_state(&sp.id).await, Err(AddressBookError::NotFound { .. })));
}

#[tokio::test]
async fn deleting_a_city_cascades() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let sao_paulo = city(&book, "São Paulo", &sp).await;
    let campinas = city(&book, "Campinas", &sp).await;
    book.create_address(draft("Augusta", "01310-100", &sao_paulo)).await.unwrap();
    book.create_address(draft("Barão de Jaguara", "13015-001", &campinas)).await.unwrap();

    let report = book.delete_city(&sao_paulo.city.id).await.unwrap();
    assert_eq!(report.addresses, 1);

    let remaining = book.list_addresses(&ListQuery::new(), &AddressFilter::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].address.street_name, "Barão de Jaguara");
    assert!(book.get_state(&sp.id).await.is_ok());
}

#[tokio::test]
async fn missing_parents_are_integrity_errors() {
    let book = book().await;

    let err = book.create_city(CityDraft::new("Atlântida", StateId::generate())).await.unwrap_err();
    assert!(matches!(err, AddressBookError::Integrity { .. }));

    let orphan = AddressDraft {
        street_suffix: StreetSuffix::Rua,
        street_name: "Perdida".to_owned(),
        neighborhood: "Nenhum".to_owned(),
        zip_code: "00000-000".to_owned(),
        city: CityId::generate(),
    };
    let err = book.create_address(orphan).await.unwrap_err();
    assert!(matches!(err, AddressBookError::Integrity { .. }));
}

#[tokio::test]
async fn updates_rerun_validation() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let sao_paulo = city(&book, "São Paulo", &sp).await;
    let created = book.create_address(draft("Augusta", "01310-100", &sao_paulo)).await.unwrap();
    let id = created.address.id.clone();

    let err = book.update_address(&id, draft("Augusta", "0131", &sao_paulo)).await.unwrap_err();
    assert!(matches!(err, AddressBookError::Format { .. }));
    assert_eq!(book.get_address(&id).await.unwrap().address.zip_code.as_str(), "01310-100");

    let updated = book.update_address(&id, draft("Augusta", "01.305-000", &sao_paulo)).await.unwrap();
    assert_eq!(updated.address.zip_code.as_str(), "01305-000");

    let renamed = book.update_state(&sp.id, StateDraft::new("Sao Paulo", "SP")).await.unwrap();
    assert_eq!(book.get_state(&sp.id).await.unwrap(), renamed);

    let err = book.update_city(&CityId::generate(), CityDraft::new("X", sp.id.clone())).await.unwrap_err();
    assert!(matches!(err, AddressBookError::NotFound { .. }));
}

#[tokio::test]
async fn admin_search_and_filters() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let rj = state(&book, "Rio de Janeiro", "RJ").await;
    let sao_paulo = city(&book, "São Paulo", &sp).await;
    let campinas = city(&book, "Campinas", &sp).await;
    let niteroi = city(&book, "Niterói", &rj).await;
    book.create_address(draft("Augusta", "01310-100", &sao_paulo)).await.unwrap();
    book.create_address(draft("Barão de Jaguara", "13015-001", &campinas)).await.unwrap();
    book.create_address(draft("Moreira César", "24230-050", &niteroi)).await.unwrap();

    let found = book.list_states(&admin::STATE_ADMIN.list_query(Some("rj".into()))).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, rj.id);

    let in_sp = book
        .list_cities(&admin::CITY_ADMIN.list_query(None), &CityFilter { state: Some(sp.id.clone()) })
        .await
        .unwrap();
    let names: Vec<_> = in_sp.iter().map(|c| c.city.name.as_str()).collect();
    assert_eq!(names, ["Campinas", "São Paulo"]);

    let by_zip = book
        .list_addresses(&admin::ADDRESS_ADMIN.list_query(Some("24230".into())), &AddressFilter::default())
        .await
        .unwrap();
    assert_eq!(by_zip.len(), 1);
    assert_eq!(by_zip[0].address.street_name, "Moreira César");

    let filter = AddressFilter { state: Some(sp.id.clone()), city: None };
    let sp_addresses = book.list_addresses(&admin::ADDRESS_ADMIN.list_query(None), &filter).await.unwrap();
    let zips: Vec<_> = sp_addresses.iter().map(|a| a.address.zip_code.as_str()).collect();
    assert_eq!(zips, ["01310-100", "13015-001"]);

    let filter = AddressFilter { state: None, city: Some(campinas.city.id.clone()) };
    let one = book.list_addresses(&ListQuery::new(), &filter).await.unwrap();
    assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn state_with_inline_city() {
    let book = book().await;

    let err = book
        .create_state_with_cities(StateDraft::new("Bahia", "BA"), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AddressBookError::InlineCount { .. }));
    assert!(book.list_states(&ListQuery::new()).await.unwrap().is_empty());

    let (ba, cities) = book
        .create_state_with_cities(StateDraft::new("Bahia", "BA"), vec!["Salvador".to_owned()])
        .await
        .unwrap();
    assert_eq!(cities.len(), 1);

    let listed = book
        .list_cities(&ListQuery::new(), &CityFilter { state: Some(ba.id.clone()) })
        .await
        .unwrap();
    assert_eq!(listed[0].to_string(), "Salvador - BA");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_writes_and_cascades_leave_no_orphans() {
    let book = book().await;

    for round in 0..25 {
        let st = state(&book, "São Paulo", "SP").await;
        let santos = city(&book, "Santos", &st).await;

        let mut writers = Vec::new();
        for n in 0..8 {
            let book = book.clone();
            let state_id = st.id.clone();
            writers.push(tokio::spawn(async move {
                book.create_city(CityDraft::new(format!("Cidade {round}-{n}"), state_id)).await.map(drop)
            }));

            let book = book.clone();
            let address = draft("Conselheiro Nébias", "11015-002", &santos);
            writers.push(tokio::spawn(async move { book.create_address(address).await.map(drop) }));
        }
        let deleter = {
            let book = book.clone();
            let state_id = st.id.clone();
            tokio::spawn(async move { book.delete_state(&state_id).await.map(drop) })
        };

        for writer in writers {
            // Either side may lose the race; only the stored result matters.
            let _ = writer.await.unwrap();
        }
        let _ = deleter.await.unwrap();
    }

    let cities = book
        .list_cities(&ListQuery::new(), &CityFilter::default())
        .await
        .expect("every city has its state");
    for city in &cities {
        assert!(book.get_state(&city.city.state).await.is_ok());
    }
    book.list_addresses(&ListQuery::new(), &AddressFilter::default())
        .await
        .expect("every address has its city");
}

#[tokio::test]
async fn writes_against_a_deleted_parent_are_rejected() {
    let book = book().await;
    let sp = state(&book, "São Paulo", "SP").await;
    let santos = city(&book, "Santos", &sp).await;
    let address = book.create_address(draft("Conselheiro Nébias", "11015-002", &santos)).await.unwrap();

    let report = book.delete_state(&sp.id).await.unwrap();
    assert_eq!(report, CascadeReport { cities: 1, addresses: 1 });

    let err = book.create_city(CityDraft::new("Guarujá", sp.id.clone())).await.unwrap_err();
    assert!(matches!(err, AddressBookError::Integrity { .. }));
    let err = book.create_address(draft("Ana Costa", "11060-001", &santos)).await.unwrap_err();
    assert!(matches!(err, AddressBookError::Integrity { .. }));

    let err = book.delete_state(&sp.id).await.unwrap_err();
    assert!(matches!(err, AddressBookError::NotFound { .. }));
    let err = book.delete_city(&santos.city.id).await.unwrap_err();
    assert!(matches!(err, AddressBookError::NotFound { .. }));
    let err = book.delete_address(&address.address.id).await.unwrap_err();
    assert!(matches!(err, AddressBookError::NotFound { .. }));
    let err = book.update_state(&sp.id, StateDraft::new("São Paulo", "SP")).await.unwrap_err();
    assert!(matches!(err, AddressBookError::NotFound { .. }));
}
