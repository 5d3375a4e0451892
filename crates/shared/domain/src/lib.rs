//! # Domain Models
//!
//! Pure data shared by every address book crate: configuration sections and the
//! persistent names (tables, slices) that several crates must agree on.
//! Keep it lean: `serde` only, no I/O and no logic beyond defaults.

pub mod config;
pub mod constants;
