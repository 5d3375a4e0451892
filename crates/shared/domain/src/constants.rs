//! Storage names shared between migrations, repositories, and tooling.

/// Migration slice key of the address book feature.
pub const ADDRESSES_SLICE: &str = "addresses";

pub const STATE: &str = "state";
pub const CITY: &str = "city";
pub const ADDRESS: &str = "address";

/// Table holding the applied migration ledger.
pub const MIGRATION: &str = "migration";
