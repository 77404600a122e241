use std::collections::BTreeSet;

use once_cell::sync::Lazy;

use super::{ContactRequest, FormStatus, SiteClient, SubmitError, Tone};
use crate::domain::{sanitize_strict, validate, Field, SubmissionFields, ValidationOptions};

const SOURCE: &str = "contact-page";
const FALLBACK_ERROR: &str = "We couldn't send your message. Please try again.";

static CLIENT_RULES: Lazy<ValidationOptions> = Lazy::new(|| {
    ValidationOptions::default()
        .with_message(Field::Name, "Please tell us your name.")
        .with_message(Field::Email, "Enter a valid work email address.")
        .with_message(Field::Message, "Please share a little about your needs.")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormInput {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: String,
}

/// State of the contact page form.
#[derive(Debug, Default)]
pub struct ContactForm {
    values: ContactFormInput,
    field_errors: BTreeSet<Field>,
    status: FormStatus,
    submitting: bool,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &ContactFormInput {
        &self.values
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn has_error(&self, field: Field) -> bool {
        self.field_errors.contains(&field)
    }

    /// Editing a field clears its error highlight and the status line.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.values.name = value,
            Field::Email => self.values.email = value,
            Field::Message => self.values.message = value,
            Field::Company => self.values.company = value,
        }
        self.field_errors.remove(&field);
        self.status.clear();
    }

    /// Validates the form and, if it is acceptable, marks it as in flight.
    /// Returns `None` when nothing should be sent, including while a previous
    /// submission is still pending.
    pub fn begin_submit(&mut self) -> Option<ContactRequest> {
        if self.submitting {
            return None;
        }
        self.status.clear();

        let fields = SubmissionFields {
            name: sanitize_strict(&self.values.name),
            email: sanitize_strict(&self.values.email),
            message: sanitize_strict(&self.values.message),
            company: sanitize_strict(&self.values.company),
        };
        let errors = validate(&fields, &CLIENT_RULES);
        self.field_errors = errors.iter().map(|(field, _)| field).collect();
        if !errors.is_empty() {
            self.status
                .set("Please correct the highlighted fields.", Some(Tone::Error));
            return None;
        }

        self.status.set("Sending…", None);
        self.submitting = true;
        Some(ContactRequest {
            name: fields.name,
            email: fields.email,
            message: fields.message,
            company: fields.company,
            source: SOURCE.to_string(),
        })
    }

    pub fn finish_submit(&mut self, outcome: Result<(), SubmitError>) {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                self.status
                    .set("Thanks! We'll be in touch shortly.", Some(Tone::Success));
                self.values = ContactFormInput::default();
                self.field_errors.clear();
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Contact form submission failed");
                let message = e.server_message().unwrap_or(FALLBACK_ERROR).to_string();
                self.status.set(message, Some(Tone::Error));
            }
        }
    }

    pub async fn submit(&mut self, client: &SiteClient) {
        if let Some(request) = self.begin_submit() {
            let outcome = client.submit_contact(&request).await;
            self.finish_submit(outcome);
        }
    }
}
