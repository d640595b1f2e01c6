//! Customer submission payload
//!
//! Wire shape of the customer creation request.

use serde::Serialize;

use crate::form::ValidatedRecord;

/// Discriminator the backend uses to pick the customer schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerKind {
    Individual,
}

/// Body of `POST <api.base_url><api.path>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Always `INDIVIDUAL` for this form
    #[serde(rename = "type")]
    pub kind: CustomerKind,
    pub first_name: String,
    /// Empty string when not given
    pub middle_name: String,
    pub last_name: String,
    /// National ID, empty string when not given
    pub egn: String,
    pub phone_number: String,
    pub email_address: String,
    pub address: String,
    pub postcode: String,
}

impl SubmissionPayload {
    pub fn from_record(record: &ValidatedRecord) -> Self {
        let r = record.record();
        SubmissionPayload {
            kind: CustomerKind::Individual,
            first_name: r.first_name.clone(),
            middle_name: r.middle_name.clone(),
            last_name: r.last_name.clone(),
            egn: r.national_id.clone(),
            phone_number: r.phone_number.clone(),
            email_address: r.email_address.clone(),
            address: r.address.clone(),
            postcode: r.postcode.clone(),
        }
    }

    /// Display submission details
    pub fn display(&self) -> String {
        let mut output = String::new();

        let full_name = [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        output.push_str(&format!("  Name: {}\n", full_name));

        if !self.egn.is_empty() {
            output.push_str(&format!("  EGN: {}\n", self.egn));
        }
        output.push_str(&format!("  Address: {}, {}\n", self.address, self.postcode));
        if !self.phone_number.is_empty() {
            output.push_str(&format!("  Phone: {}\n", self.phone_number));
        }
        if !self.email_address.is_empty() {
            output.push_str(&format!("  Email: {}\n", self.email_address));
        }

        output
    }
}
