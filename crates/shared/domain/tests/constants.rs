use abook_domain::constants::{ADDRESS, ADDRESSES_SLICE, CITY, MIGRATION, STATE};

#[test]
fn constants_match_table_names() {
    assert_eq!(STATE, "state");
    assert_eq!(CITY, "city");
    assert_eq!(ADDRESS, "address");
    assert_eq!(MIGRATION, "migration");
    assert_eq!(ADDRESSES_SLICE, "addresses");
}
