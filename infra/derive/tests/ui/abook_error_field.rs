use abook_derive::abook_error;
use std::borrow::Cow;

#[abook_error]
pub enum FormError {
    #[error("{field} is invalid{}: {message}", format_context(.context))]
    Invalid {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing record{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err = FormError::Invalid {
        field: "zip_code".into(),
        message: "bad".into(),
        context: None,
    };
    assert_eq!(err.field(), Some("zip_code"));
}
