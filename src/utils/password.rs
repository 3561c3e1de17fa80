//! Password strength rules applied at sign-up.

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters that satisfy the "special character" rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// True when `password` is long enough and mixes upper case, lower case,
/// digits and at least one of [`SPECIAL_CHARS`].
pub fn is_valid_password(password: &str) -> bool {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return false;
    }

    let mut upper = false;
    let mut lower = false;
    let mut digit = false;
    let mut special = false;

    for c in password.chars() {
        if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c.is_ascii_digit() {
            digit = true;
        } else if SPECIAL_CHARS.contains(c) {
            special = true;
        }
    }

    upper && lower && digit && special
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(is_valid_password("PassValid1!"));
        assert!(is_valid_password("StrongPassword1@"));
        assert!(is_valid_password("Another$Valid2"));
    }

    #[test]
    fn test_invalid_password_length() {
        assert!(!is_valid_password("Short1!"));
        assert!(is_valid_password("Short12!"));
    }

    #[test]
    fn test_invalid_password_missing_class() {
        assert!(!is_valid_password("invalidpassword1!"));
        assert!(!is_valid_password("INVALIDPASSWORD1!"));
        assert!(!is_valid_password("NoDigit!"));
        assert!(!is_valid_password("NoSpecialChar1"));
    }

    #[test]
    fn test_unlisted_symbol_is_not_special() {
        assert!(!is_valid_password("Password1_"));
        assert!(!is_valid_password(""));
    }
}
