// Submission request models
// The flat payload handed to whatever backend receives leads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::fields::{FieldKey, FieldValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormKind {
    Contact,
    Quote,
}

impl FormKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Quote => "quote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub form: FormKind,
    pub correlation_id: String,
    pub submitted_at: DateTime<Utc>,
    /// Every declared field of the form, keyed by wire name.
    pub fields: BTreeMap<String, String>,
}

impl SubmissionPayload {
    pub fn from_fields<K: FieldKey>(form: FormKind, values: &FieldValues<K>) -> Self {
        Self {
            form,
            correlation_id: Uuid::new_v4().simple().to_string(),
            submitted_at: Utc::now(),
            fields: values.to_wire(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::ContactField;

    #[test]
    fn payload_serializes_camel_case_with_all_fields() {
        let mut values = FieldValues::<ContactField>::new();
        values.set(ContactField::Name, "Jo");
        let payload = SubmissionPayload::from_fields(FormKind::Contact, &values);

        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["form"], "contact");
        assert_eq!(json["fields"]["name"], "Jo");
        assert_eq!(json["fields"]["message"], "");
        assert!(json["correlationId"].as_str().is_some_and(|s| s.len() == 32));
        assert!(json.get("submittedAt").is_some());
    }

    #[test]
    fn each_payload_gets_its_own_correlation_id() {
        let values = FieldValues::<ContactField>::new();
        let a = SubmissionPayload::from_fields(FormKind::Contact, &values);
        let b = SubmissionPayload::from_fields(FormKind::Contact, &values);
        assert_ne!(a.correlation_id, b.correlation_id);
    }
}
