//! Customer form model
//!
//! Raw field values, the per-field error map, and the record-level validator
//! that composes the individual rules.

pub mod egn;
pub mod rules;
pub mod state;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::FieldPolicy;

pub use state::FormState;

/// One input of the individual customer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    MiddleName,
    LastName,
    #[serde(rename = "egn")]
    NationalId,
    Address,
    Postcode,
    PhoneNumber,
    EmailAddress,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::FirstName,
        Field::MiddleName,
        Field::LastName,
        Field::NationalId,
        Field::Address,
        Field::Postcode,
        Field::PhoneNumber,
        Field::EmailAddress,
    ];

    /// Wire name used in the JSON payload and in server error echoes.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::MiddleName => "middleName",
            Field::LastName => "lastName",
            Field::NationalId => "egn",
            Field::Address => "address",
            Field::Postcode => "postcode",
            Field::PhoneNumber => "phoneNumber",
            Field::EmailAddress => "emailAddress",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|f| f.wire_name() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::MiddleName => "Middle name",
            Field::LastName => "Last name",
            Field::NationalId => "EGN",
            Field::Address => "Address",
            Field::Postcode => "Postcode",
            Field::PhoneNumber => "Phone number",
            Field::EmailAddress => "Email address",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::PhoneNumber => "+00123456789",
            Field::EmailAddress => "name@example.com",
            Field::Postcode => "1000",
            Field::NationalId => "10 digits",
            _ => "",
        }
    }

    pub fn index(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = self.index();
        if idx == 0 {
            Field::ALL[Field::ALL.len() - 1]
        } else {
            Field::ALL[idx - 1]
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Raw values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    #[serde(rename = "egn")]
    pub national_id: String,
    pub address: String,
    pub postcode: String,
    pub phone_number: String,
    pub email_address: String,
}

impl FormRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::MiddleName => &self.middle_name,
            Field::LastName => &self.last_name,
            Field::NationalId => &self.national_id,
            Field::Address => &self.address,
            Field::Postcode => &self.postcode,
            Field::PhoneNumber => &self.phone_number,
            Field::EmailAddress => &self.email_address,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::MiddleName => &mut self.middle_name,
            Field::LastName => &mut self.last_name,
            Field::NationalId => &mut self.national_id,
            Field::Address => &mut self.address,
            Field::Postcode => &mut self.postcode,
            Field::PhoneNumber => &mut self.phone_number,
            Field::EmailAddress => &mut self.email_address,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    fn trimmed(&self) -> Self {
        let mut out = Self::default();
        for field in Field::ALL {
            out.set(field, self.get(field).trim());
        }
        out
    }
}

/// Field name to error messages. An empty map means the record is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        let message = message.into();
        let entry = self.0.entry(field).or_default();
        if !entry.contains(&message) {
            entry.push(message);
        }
    }

    pub fn extend(&mut self, field: Field, messages: impl IntoIterator<Item = String>) {
        for message in messages {
            self.push(field, message);
        }
    }

    pub fn get(&self, field: Field) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(field, _)| *field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.0
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| (*field, m.as_str())))
    }

    pub fn merge(&mut self, other: &FieldErrors) {
        for (field, message) in other.iter() {
            self.push(field, message);
        }
    }

    /// Flat `field: message` lines, in field order.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(field, message)| format!("{}: {}", field.label(), message))
            .collect()
    }
}

/// A normalized record that passed [`validate_with`]. Only the validator builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord(FormRecord);

impl ValidatedRecord {
    pub fn record(&self) -> &FormRecord {
        &self.0
    }
}

/// Validate with the default requirement flags.
#[cfg(test)]
pub fn validate(record: &FormRecord) -> Result<ValidatedRecord, FieldErrors> {
    validate_with(record, &FieldPolicy::default())
}

/// Validate every field, then append the cross-field contact check.
pub fn validate_with(
    record: &FormRecord,
    policy: &FieldPolicy,
) -> Result<ValidatedRecord, FieldErrors> {
    let normalized = record.trimmed();
    let mut errors = FieldErrors::new();

    for field in Field::ALL {
        let required = policy.is_required(field);
        if let Err(messages) = rules::check_field(field, normalized.get(field), required) {
            errors.extend(field, messages);
        }
    }

    if policy.require_contact {
        if let Err(message) =
            rules::check_contact(&normalized.phone_number, &normalized.email_address)
        {
            errors.push(Field::PhoneNumber, message);
            errors.push(Field::EmailAddress, message);
        }
    }

    if errors.is_empty() {
        Ok(ValidatedRecord(normalized))
    } else {
        Err(errors)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn ivan() -> FormRecord {
        FormRecord {
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            address: "1 Main St".to_string(),
            postcode: "1000".to_string(),
            email_address: "a@b.com".to_string(),
            ..FormRecord::default()
        }
    }

    #[test]
    fn minimal_record_is_valid() {
        let valid = validate(&ivan()).expect("record should validate");
        assert_eq!(valid.record(), &ivan());
    }

    #[test]
    fn values_are_trimmed_before_checks() {
        let mut record = ivan();
        record.first_name = "  Ivan ".to_string();
        record.postcode = " 1000".to_string();
        let valid = validate(&record).unwrap();
        assert_eq!(valid.record().first_name, "Ivan");
        assert_eq!(valid.record().postcode, "1000");
    }

    #[test]
    fn empty_record_reports_required_fields() {
        let errors = validate(&FormRecord::default()).unwrap_err();
        assert_eq!(errors.get(Field::FirstName), ["First name is required"]);
        assert_eq!(errors.get(Field::LastName), ["Last name is required"]);
        assert_eq!(errors.get(Field::Address), ["Address is required"]);
        assert_eq!(errors.get(Field::Postcode), ["Postal Code is required"]);
        assert!(errors.get(Field::MiddleName).is_empty());
        assert!(errors.get(Field::NationalId).is_empty());
    }

    #[test]
    fn missing_contact_flags_both_contact_fields() {
        let mut record = ivan();
        record.email_address.clear();
        let errors = validate(&record).unwrap_err();
        assert_eq!(
            errors.get(Field::PhoneNumber),
            ["Either phone or email should be filled in."]
        );
        assert_eq!(
            errors.get(Field::EmailAddress),
            ["Either phone or email should be filled in."]
        );
        assert_eq!(errors.fields().count(), 2);
    }

    #[test]
    fn phone_alone_satisfies_contact_rule() {
        let mut record = ivan();
        record.email_address.clear();
        record.phone_number = "+00123456789".to_string();
        assert!(validate(&record).is_ok());
    }

    #[test]
    fn whitespace_only_contacts_count_as_empty() {
        let mut record = ivan();
        record.email_address = "   ".to_string();
        assert!(validate(&record).is_err());
    }

    #[test]
    fn policy_can_require_optional_fields() {
        let policy = FieldPolicy {
            require_egn: true,
            ..FieldPolicy::default()
        };
        let errors = validate_with(&ivan(), &policy).unwrap_err();
        assert_eq!(errors.get(Field::NationalId), ["EGN is required"]);
    }

    #[test]
    fn policy_can_relax_contact_rule() {
        let policy = FieldPolicy {
            require_contact: false,
            ..FieldPolicy::default()
        };
        let mut record = ivan();
        record.email_address.clear();
        assert!(validate_with(&record, &policy).is_ok());
    }

    #[test]
    fn field_errors_deduplicate_messages() {
        let mut errors = FieldErrors::new();
        errors.push(Field::Address, "Address is too short");
        errors.push(Field::Address, "Address is too short");
        assert_eq!(errors.get(Field::Address).len(), 1);
        assert_eq!(errors.to_lines(), ["Address: Address is too short"]);
    }

    #[test]
    fn field_navigation_wraps() {
        assert_eq!(Field::FirstName.prev(), Field::EmailAddress);
        assert_eq!(Field::EmailAddress.next(), Field::FirstName);
        assert_eq!(Field::from_wire_name("egn"), Some(Field::NationalId));
        assert_eq!(Field::from_wire_name("nope"), None);
    }
}
