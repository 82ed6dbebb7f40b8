/// Number of digits in a phone number.
const PHONE_DIGITS: usize = 8;
/// Characters a password may not contain.
const FORBIDDEN_PASSWORD_CHARS: [char; 3] = ['_', '#', '%'];

/// Validates a phone number: exactly eight ASCII digits.
pub fn is_phone(phone: &str, _ctx: &()) -> garde::Result {
    if phone.len() != PHONE_DIGITS || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(garde::Error::new("phone must be exactly 8 digits"));
    }

    Ok(())
}

/// Validates the character set of a password.
pub fn valid_password(password: &str, _ctx: &()) -> garde::Result {
    if password.contains(FORBIDDEN_PASSWORD_CHARS) {
        return Err(garde::Error::new("password may not contain '_', '#' or '%'"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_rules() {
        assert!(is_phone("99989992", &()).is_ok());
        assert!(is_phone("9998999", &()).is_err());
        assert!(is_phone("999899921", &()).is_err());
        assert!(is_phone("9998999a", &()).is_err());
        assert!(is_phone("", &()).is_err());
        assert!(is_phone("٩٩٩٨٩٩٩٢", &()).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(valid_password("secret", &()).is_ok());
        assert!(valid_password("Secret!@$", &()).is_ok());
        assert!(valid_password("sec_ret", &()).is_err());
        assert!(valid_password("sec#ret", &()).is_err());
        assert!(valid_password("100%", &()).is_err());
    }
}
