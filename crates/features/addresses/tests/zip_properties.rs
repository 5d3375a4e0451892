use abook_addresses::{AddressBookError, normalize_zip_code, validate_zip_code};
use proptest::prelude::*;

proptest! {
    #[test]
    fn eight_digits_normalize_to_canonical(digits in "[0-9]{8}") {
        let normalized = normalize_zip_code(&digits);
        prop_assert_eq!(&normalized, &format!("{}-{}", &digits[..5], &digits[5..]));
        prop_assert_eq!(normalize_zip_code(&normalized), normalized.clone());
        prop_assert!(validate_zip_code(&normalized).is_ok());
    }

    #[test]
    fn separators_are_ignored(digits in "[0-9]{8}", sep in "[ ./-]{0,3}") {
        let noisy = format!("{}{sep}{}", &digits[..2], &digits[2..]);
        prop_assert_eq!(normalize_zip_code(&noisy), normalize_zip_code(&digits));
    }

    #[test]
    fn other_digit_counts_pass_through_and_fail(input in "[0-9-]{0,12}") {
        let digits = input.chars().filter(char::is_ascii_digit).count();
        prop_assume!(digits != 8);

        prop_assert_eq!(normalize_zip_code(&input), input.clone());
        let is_format_error =
            matches!(validate_zip_code(&input), Err(AddressBookError::Format { .. }));
        prop_assert!(is_format_error);
    }

    #[test]
    fn normalization_is_idempotent(input in "\\PC{0,16}") {
        let once = normalize_zip_code(&input);
        prop_assert_eq!(normalize_zip_code(&once), once.clone());
    }
}
