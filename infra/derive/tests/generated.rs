use abook_derive::abook_error;
use std::borrow::Cow;

#[abook_error]
pub enum SampleError {
    #[error("Bad {field}{}: {message}", format_context(.context))]
    Invalid {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn failing_io() -> std::result::Result<(), std::io::Error> {
    Err(std::io::Error::other("disk gone"))
}

#[test]
fn context_is_attached_to_source_errors() {
    let err = failing_io().context("Loading states").unwrap_err();
    assert!(matches!(err, SampleError::Io { .. }));
    assert_eq!(err.to_string(), "IO error (Loading states): disk gone");
}

#[test]
fn context_overrides_on_own_errors() {
    let result: Result<()> = Err(SampleError::from("boom"));
    let err = result.context("Saving city").unwrap_err();
    assert_eq!(err.to_string(), "Internal error (Saving city): boom");
}

#[test]
fn question_mark_converts_sources() {
    fn run() -> Result<()> {
        failing_io()?;
        Ok(())
    }
    let err = run().unwrap_err();
    assert_eq!(err.to_string(), "IO error: disk gone");
}

#[test]
fn field_accessor_reports_offending_field() {
    let err = SampleError::Invalid {
        field: "abbreviation".into(),
        message: "must have 2 characters".into(),
        context: None,
    };
    assert_eq!(err.field(), Some("abbreviation"));
    assert_eq!(SampleError::from(String::from("x")).field(), None);
}
