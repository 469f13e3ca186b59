use proptest::prelude::*;
use proptest::test_runner::Config;
use validocu_engine::{check_digit, is_valid_rut};

const DIGITS: [char; 11] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'K'];

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn computed_check_digit_validates(body in 1_u32..99_999_999_u32) {
        let dv = check_digit(&body.to_string()).unwrap();
        let plain = format!("{}-{}", body, dv);
        prop_assert!(is_valid_rut(&plain));
        prop_assert!(is_valid_rut(&plain.to_lowercase()));
    }

    #[test]
    fn any_other_check_digit_is_rejected(body in 1_u32..99_999_999_u32, pick in 0_usize..11) {
        let dv = check_digit(&body.to_string()).unwrap();
        let other = DIGITS[pick];
        prop_assume!(other != dv);
        let candidate = format!("{}-{}", body, other);
        prop_assert!(!is_valid_rut(&candidate));
    }
}
