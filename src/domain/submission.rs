use chrono::{DateTime, Utc};

use super::validation::{validate, FieldErrors, SubmissionFields, ValidationOptions};
use super::Sanitizer;

/// Parsed request body. Anything other than a JSON object is treated as an
/// object without fields.
#[derive(Debug, Default)]
pub struct RawSubmission(serde_json::Map<String, serde_json::Value>);

impl RawSubmission {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        match value {
            serde_json::Value::Object(fields) => Ok(Self(fields)),
            _ => Ok(Self::default()),
        }
    }

    /// Sanitized text of `key`; empty when absent.
    pub fn text(&self, key: &str, sanitizer: Sanitizer) -> String {
        sanitizer.clean_value(self.0.get(key))
    }

    pub fn fields(&self, sanitizer: Sanitizer) -> SubmissionFields {
        SubmissionFields {
            name: self.text("name", sanitizer),
            email: self.text("email", sanitizer),
            message: self.text("message", sanitizer),
            company: self.text("company", sanitizer),
        }
    }
}

/// A submission that passed every field rule. `submitted_at` and `ip` are
/// assigned on the server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl SubmissionPayload {
    pub fn accept(
        fields: SubmissionFields,
        options: &ValidationOptions,
        source: String,
        ip: Option<String>,
    ) -> Result<Self, FieldErrors> {
        let errors = validate(&fields, options);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            name: fields.name,
            email: fields.email,
            company: fields.company,
            message: fields.message,
            submitted_at: Utc::now(),
            source,
            ip,
        })
    }
}
