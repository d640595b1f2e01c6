//! Per-field rules.
//!
//! Each rule takes an already-trimmed value and returns every message that
//! applies, so a field can report a charset problem and a length problem at
//! the same time. Empty optional values always pass.

use std::sync::LazyLock;

use regex::Regex;

use super::egn;
use super::Field;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 64;
pub const ADDRESS_MIN_LEN: usize = 2;
pub const ADDRESS_MAX_LEN: usize = 255;
pub const POSTCODE_LEN: usize = 4;

pub const NAME_CHARSET_MESSAGE: &str =
    "Invalid characters. Only letters, apostrophes, hyphens, and spaces are allowed.";
pub const PHONE_MESSAGE: &str = "Invalid number - must start with +00, followed by 9-16 digits.";
pub const EMAIL_MESSAGE: &str = "This is not a valid email.";
pub const CONTACT_MESSAGE: &str = "Either phone or email should be filled in.";

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z' -]+$").expect("Invalid name regex pattern"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+00[0-9]{9,16}$").expect("Invalid phone regex pattern"));

// Leading dots and consecutive dots in the local part are checked separately.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("Invalid email regex pattern")
});

pub type RuleResult = Result<(), Vec<String>>;

/// Dispatch a field to its rule.
pub fn check_field(field: Field, value: &str, required: bool) -> RuleResult {
    match field {
        Field::FirstName | Field::MiddleName | Field::LastName => {
            check_name(field, value, required)
        }
        Field::NationalId => check_national_id(value, required),
        Field::Address => check_address(value, required),
        Field::Postcode => check_postcode(value, required),
        Field::PhoneNumber => check_phone(value, required),
        Field::EmailAddress => check_email(value, required),
    }
}

fn required_message(field: Field) -> String {
    match field {
        Field::Postcode => "Postal Code is required".to_string(),
        _ => format!("{} is required", field.label()),
    }
}

fn outcome(errors: Vec<String>) -> RuleResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Empty check shared by every rule. `Some` short-circuits the rule.
fn presence(field: Field, value: &str, required: bool) -> Option<RuleResult> {
    if !value.is_empty() {
        return None;
    }
    if required {
        Some(Err(vec![required_message(field)]))
    } else {
        Some(Ok(()))
    }
}

pub fn check_name(field: Field, value: &str, required: bool) -> RuleResult {
    if let Some(result) = presence(field, value, required) {
        return result;
    }

    let mut errors = Vec::new();
    if !is_valid_name_charset(value) {
        errors.push(NAME_CHARSET_MESSAGE.to_string());
    }
    let len = value.chars().count();
    if len < NAME_MIN_LEN {
        errors.push("Name is too short".to_string());
    }
    if len > NAME_MAX_LEN {
        errors.push("Name is too long".to_string());
    }
    outcome(errors)
}

pub fn is_valid_name_charset(value: &str) -> bool {
    NAME_PATTERN.is_match(value)
}

pub fn check_national_id(value: &str, required: bool) -> RuleResult {
    if let Some(result) = presence(Field::NationalId, value, required) {
        return result;
    }

    let message = match egn::validate_egn(value) {
        Ok(_) => return Ok(()),
        Err(egn::EgnError::NotNumeric) => "EGN must be a number",
        Err(egn::EgnError::WrongLength(_)) => "EGN must be 10 digit long",
        Err(_) => "EGN is not valid",
    };
    Err(vec![message.to_string()])
}

pub fn check_address(value: &str, required: bool) -> RuleResult {
    if let Some(result) = presence(Field::Address, value, required) {
        return result;
    }

    let len = value.chars().count();
    if len < ADDRESS_MIN_LEN {
        return Err(vec!["Address is too short".to_string()]);
    }
    if len > ADDRESS_MAX_LEN {
        return Err(vec!["Address is too long".to_string()]);
    }
    Ok(())
}

pub fn check_postcode(value: &str, required: bool) -> RuleResult {
    if let Some(result) = presence(Field::Postcode, value, required) {
        return result;
    }

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(vec!["Postal Code must be a number".to_string()]);
    }
    if value.len() != POSTCODE_LEN {
        return Err(vec!["Postal Code must be 4 digit long".to_string()]);
    }
    Ok(())
}

pub fn check_phone(value: &str, required: bool) -> RuleResult {
    if let Some(result) = presence(Field::PhoneNumber, value, required) {
        return result;
    }

    if PHONE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(vec![PHONE_MESSAGE.to_string()])
    }
}

pub fn check_email(value: &str, required: bool) -> RuleResult {
    if let Some(result) = presence(Field::EmailAddress, value, required) {
        return result;
    }

    if is_valid_email(value) {
        Ok(())
    } else {
        Err(vec![EMAIL_MESSAGE.to_string()])
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let local = match value.split_once('@') {
        Some((local, _)) => local,
        None => return false,
    };
    !local.starts_with('.') && !local.contains("..") && EMAIL_PATTERN.is_match(value)
}

/// At least one contact method must be present.
pub fn check_contact(phone: &str, email: &str) -> Result<(), &'static str> {
    if phone.is_empty() && email.is_empty() {
        Err(CONTACT_MESSAGE)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_accept_letters_apostrophes_hyphens_spaces() {
        assert!(check_name(Field::FirstName, "Ivan", true).is_ok());
        assert!(check_name(Field::FirstName, "O'Neil", true).is_ok());
        assert!(check_name(Field::LastName, "Smith-Jones", true).is_ok());
        assert!(check_name(Field::LastName, "van der Berg", true).is_ok());
        assert!(check_name(Field::FirstName, "Jo", true).is_ok());
        assert!(check_name(Field::FirstName, &"a".repeat(64), true).is_ok());
    }

    #[test]
    fn names_reject_digits_and_other_punctuation() {
        for bad in ["Iv4n", "Ivan!", "Ivan.", "Ivan_P", "Ivan,", "Иван"] {
            let errors = check_name(Field::FirstName, bad, true).unwrap_err();
            assert_eq!(errors, vec![NAME_CHARSET_MESSAGE.to_string()], "{bad}");
        }
    }

    #[test]
    fn names_enforce_length_bounds() {
        assert_eq!(
            check_name(Field::FirstName, "A", true).unwrap_err(),
            vec!["Name is too short".to_string()]
        );
        assert_eq!(
            check_name(Field::FirstName, &"a".repeat(65), true).unwrap_err(),
            vec!["Name is too long".to_string()]
        );
    }

    #[test]
    fn name_reports_charset_and_length_together() {
        let errors = check_name(Field::FirstName, "1", true).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn optional_middle_name_only_checked_when_present() {
        assert!(check_name(Field::MiddleName, "", false).is_ok());
        assert!(check_name(Field::MiddleName, "X", false).is_err());
        assert_eq!(
            check_name(Field::FirstName, "", true).unwrap_err(),
            vec!["First name is required".to_string()]
        );
    }

    #[test]
    fn postcode_requires_exactly_four_digits() {
        assert!(check_postcode("1000", true).is_ok());
        assert!(check_postcode("9999", true).is_ok());
        assert!(check_postcode("0123", true).is_ok());
        assert_eq!(
            check_postcode("123", true).unwrap_err(),
            vec!["Postal Code must be 4 digit long".to_string()]
        );
        assert!(check_postcode("12345", true).is_err());
        assert_eq!(
            check_postcode("10a0", true).unwrap_err(),
            vec!["Postal Code must be a number".to_string()]
        );
        assert!(check_postcode("", true).is_err());
        assert!(check_postcode("", false).is_ok());
    }

    #[test]
    fn phone_requires_prefix_and_digit_count() {
        assert!(check_phone("", false).is_ok());
        assert!(check_phone("+00123456789", false).is_ok());
        assert!(check_phone(&format!("+00{}", "1".repeat(16)), false).is_ok());

        assert!(check_phone("123456789", false).is_err());
        assert!(check_phone("+359123456789", false).is_err());
        assert!(check_phone("0012345678901", false).is_err());
        assert!(check_phone("+0012345678", false).is_err());
        assert!(check_phone(&format!("+00{}", "1".repeat(17)), false).is_err());
        assert!(check_phone("+00 123 456 789", false).is_err());
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(is_valid_email("o'neil@example.co"));

        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a.b.com"));
        assert!(!is_valid_email(".a@b.com"));
        assert!(!is_valid_email("a..b@b.com"));
        assert!(!is_valid_email("a.@b.com"));
        assert!(!is_valid_email("a@-b.com"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(check_email("", false).is_ok());
    }

    #[test]
    fn address_length_bounds() {
        assert!(check_address("1 Main St", true).is_ok());
        assert_eq!(
            check_address("A", true).unwrap_err(),
            vec!["Address is too short".to_string()]
        );
        assert!(check_address(&"x".repeat(255), true).is_ok());
        assert!(check_address(&"x".repeat(256), true).is_err());
        assert_eq!(
            check_address("", true).unwrap_err(),
            vec!["Address is required".to_string()]
        );
    }

    #[test]
    fn national_id_messages() {
        assert!(check_national_id("", false).is_ok());
        assert!(check_national_id("7503169269", false).is_ok());
        assert_eq!(
            check_national_id("75031692", false).unwrap_err(),
            vec!["EGN must be 10 digit long".to_string()]
        );
        assert_eq!(
            check_national_id("75031692AB", false).unwrap_err(),
            vec!["EGN must be a number".to_string()]
        );
        assert_eq!(
            check_national_id("7503169260", false).unwrap_err(),
            vec!["EGN is not valid".to_string()]
        );
    }

    #[test]
    fn contact_rule() {
        assert_eq!(check_contact("", ""), Err(CONTACT_MESSAGE));
        assert!(check_contact("+00123456789", "").is_ok());
        assert!(check_contact("", "a@b.com").is_ok());
    }
}
