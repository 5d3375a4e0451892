use abook_database::DatabaseError;
use std::borrow::Cow;

/// Errors raised by the address book slice.
///
/// Validation variants (`Format`, `Length`, `InvalidChoice`, `InlineCount`, `Integrity`)
/// are raised before any write, so a failed operation never changes stored data.
#[abook_derive::abook_error]
pub enum AddressBookError {
    /// A value does not have the required shape, e.g. a zip code that is not `00000-000`.
    #[error("Invalid {field}{}: {message}", format_context(.context))]
    Format {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A text field is empty or longer than its maximum length.
    #[error("Invalid length for {field}{}: {message}", format_context(.context))]
    Length {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A value outside a closed set of choices.
    #[error("Invalid choice for {field}{}: {message}", format_context(.context))]
    InvalidChoice {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// Wrong number of inline rows submitted with a parent record.
    #[error("Invalid inline count{}: {message}", format_context(.context))]
    InlineCount { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A referenced parent record does not exist.
    #[error("Integrity error{}: {message}", format_context(.context))]
    Integrity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Query error{}: {source}", format_context(.context))]
    Query { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AddressBookError {
    pub(crate) fn length(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Length { field: field.into(), message: message.into(), context: None }
    }

    pub(crate) fn not_found(what: &'static str, uid: &str) -> Self {
        Self::NotFound { message: format!("{what} '{uid}' does not exist").into(), context: None }
    }

    pub(crate) fn integrity(what: &'static str, uid: &str) -> Self {
        Self::Integrity {
            message: format!("referenced {what} '{uid}' does not exist").into(),
            context: None,
        }
    }

    /// Whether the error was raised by validation rather than storage.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Format { .. }
                | Self::Length { .. }
                | Self::InvalidChoice { .. }
                | Self::InlineCount { .. }
                | Self::Integrity { .. }
        )
    }
}
