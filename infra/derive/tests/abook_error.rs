#[test]
fn abook_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/abook_error_pass.rs");
    t.pass("tests/ui/abook_error_field.rs");
}
