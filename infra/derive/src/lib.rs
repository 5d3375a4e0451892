#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the address book infrastructure.
//!
//! ## Usage
//! Every crate in the workspace declares its error enum through [`macro@abook_error`]:
//! ```toml
//! [dependencies]
//! abook-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! Examples are `ignore`d to avoid compiling in this crate; the `tests/ui` cases
//! are the compiled reference.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// Turns a plain enum with struct-like variants into a `thiserror` error with
/// context propagation helpers.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `Result<T, E = ErrorName>` type alias in the same module.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and for
///   `Result<T, SourceError>` of every variant with a source field.
/// * `From<SourceError>` for variants with a `source` field (or a field marked
///   `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant is present.
/// * `ErrorName::field()` returning the offending field name when any variant carries a
///   `field: Cow<'static, str>` member.
/// * A module-private `format_context` helper used from `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Must be applied to an **enum** with named-field variants only.
/// 2. A `context` field must have the type `Option<Cow<'static, str>>`.
/// 3. Variants wrapping an upstream error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use abook_derive::abook_error;
/// use std::borrow::Cow;
///
/// #[abook_error]
/// pub enum RepositoryError {
///     #[error("Invalid value for {field}{}: {message}", format_context(.context))]
///     Invalid {
///         field: Cow<'static, str>,
///         message: Cow<'static, str>,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Storage error{}: {source}", format_context(.context))]
///     Storage { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Vec<u8>> {
///     std::fs::read("cities.json").context("Reading city fixtures")
/// }
/// ```
#[proc_macro_attribute]
pub fn abook_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
