//! Explicit form state: values, live errors, touched fields.
//!
//! All updates are plain methods; the UI dispatches into them and reads the
//! result back for rendering.

use std::collections::BTreeSet;

use crate::config::FieldPolicy;
use crate::submission::SubmitOutcome;

use super::{validate_with, Field, FieldErrors, FormRecord, ValidatedRecord};

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub values: FormRecord,
    pub errors: FieldErrors,
    pub touched: BTreeSet<Field>,
    pub submit_attempted: bool,
    policy: FieldPolicy,
    /// Errors echoed back by the server for the last failed submit.
    server_errors: FieldErrors,
}

impl FormState {
    pub fn new(policy: FieldPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &FieldPolicy {
        &self.policy
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    /// Store a raw value and revalidate the whole record.
    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        self.values.set(field, value);
        self.touched.insert(field);
        self.server_errors = FieldErrors::new();
        self.revalidate();
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        let mut value = self.values.get(field).to_string();
        value.push(c);
        self.set_value(field, value);
    }

    pub fn pop_char(&mut self, field: Field) {
        let mut value = self.values.get(field).to_string();
        value.pop();
        self.set_value(field, value);
    }

    /// Blur.
    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate();
    }

    pub fn revalidate(&mut self) -> Option<ValidatedRecord> {
        match validate_with(&self.values, &self.policy) {
            Ok(valid) => {
                self.errors = self.server_errors.clone();
                if self.errors.is_empty() {
                    Some(valid)
                } else {
                    None
                }
            }
            Err(errors) => {
                self.errors = errors;
                self.errors.merge(&self.server_errors);
                None
            }
        }
    }

    /// Errors the user should currently see for `field`.
    pub fn visible_errors(&self, field: Field) -> &[String] {
        if self.submit_attempted || self.touched.contains(&field) {
            self.errors.get(field)
        } else {
            &[]
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Reveal every error and hand back the record if it can be sent.
    pub fn attempt_submit(&mut self) -> Option<ValidatedRecord> {
        self.submit_attempted = true;
        self.server_errors = FieldErrors::new();
        self.revalidate()
    }

    pub fn apply_outcome(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Succeeded => self.reset(),
            SubmitOutcome::Failed { field_errors, .. } => {
                self.server_errors = field_errors.clone();
                self.errors.merge(field_errors);
            }
            SubmitOutcome::Ignored => {}
        }
    }

    /// Back to an empty form, keeping the requirement flags.
    pub fn reset(&mut self) {
        let policy = std::mem::take(&mut self.policy);
        *self = Self::new(policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::tests::ivan;

    fn filled() -> FormState {
        let mut state = FormState::new(FieldPolicy::default());
        let record = ivan();
        for field in Field::ALL {
            state.set_value(field, record.get(field));
        }
        state
    }

    #[test]
    fn errors_hidden_until_touched() {
        let mut state = FormState::new(FieldPolicy::default());
        state.revalidate();
        assert!(!state.errors.get(Field::FirstName).is_empty());
        assert!(state.visible_errors(Field::FirstName).is_empty());

        state.set_value(Field::FirstName, "I");
        assert_eq!(state.visible_errors(Field::FirstName), ["Name is too short"]);
        assert!(state.visible_errors(Field::LastName).is_empty());
    }

    #[test]
    fn live_validation_clears_as_user_types() {
        let mut state = FormState::new(FieldPolicy::default());
        state.push_char(Field::FirstName, 'I');
        assert!(!state.errors.get(Field::FirstName).is_empty());
        state.push_char(Field::FirstName, 'v');
        assert!(state.errors.get(Field::FirstName).is_empty());
        state.pop_char(Field::FirstName);
        assert!(!state.errors.get(Field::FirstName).is_empty());
    }

    #[test]
    fn attempt_submit_reveals_all_errors() {
        let mut state = FormState::new(FieldPolicy::default());
        assert!(state.attempt_submit().is_none());
        assert_eq!(
            state.visible_errors(Field::Address),
            ["Address is required"]
        );
        assert!(!state.visible_errors(Field::EmailAddress).is_empty());
    }

    #[test]
    fn attempt_submit_returns_normalized_record() {
        let mut state = filled();
        let record = state.attempt_submit().expect("valid");
        assert_eq!(record.record(), &ivan());
    }

    #[test]
    fn success_resets_failure_keeps_values() {
        let mut state = filled();
        state.apply_outcome(&SubmitOutcome::Failed {
            message: "boom".to_string(),
            field_errors: FieldErrors::new(),
        });
        assert_eq!(state.values, ivan());

        state.apply_outcome(&SubmitOutcome::Succeeded);
        assert!(state.values.is_empty());
        assert!(state.touched.is_empty());
        assert!(!state.submit_attempted);
    }

    #[test]
    fn server_field_errors_stick_until_edit() {
        let mut state = filled();
        let mut echoed = FieldErrors::new();
        echoed.push(Field::EmailAddress, "Email already registered");
        state.apply_outcome(&SubmitOutcome::Failed {
            message: "409".to_string(),
            field_errors: echoed,
        });
        assert_eq!(
            state.visible_errors(Field::EmailAddress),
            ["Email already registered"]
        );
        assert!(state.revalidate().is_none());

        state.set_value(Field::EmailAddress, "c@d.com");
        assert!(state.is_valid());
    }

    #[test]
    fn reset_keeps_policy() {
        let policy = FieldPolicy {
            require_egn: true,
            ..FieldPolicy::default()
        };
        let mut state = FormState::new(policy.clone());
        state.set_value(Field::FirstName, "Ivan");
        state.reset();
        assert_eq!(state.policy(), &policy);
        assert!(state.values.is_empty());
    }
}
