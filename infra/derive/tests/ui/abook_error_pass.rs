use abook_derive::abook_error;
use std::borrow::Cow;

#[abook_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<Vec<u8>> {
    std::fs::read("missing.cep").context("Reading zip codes")
}

fn main() {
    let _ = read();
}
