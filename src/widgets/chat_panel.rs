use once_cell::sync::Lazy;

use super::{FormStatus, LeadRequest, SiteClient, SubmitError, Tone};
use crate::domain::{sanitize_strict, validate, Field, SubmissionFields, ValidationOptions};

const GREETING: &str = "Hi there! I’m the Icarius assistant. Ask me about our services or leave a note and we’ll follow up.";
const ACKNOWLEDGEMENT: &str = "Thanks for reaching out! A consultant will respond soon via email.";
const FALLBACK_ERROR: &str = "We couldn’t send that. Please try again.";

static CANNED_RESPONSES: [(&str, &str); 3] = [
    (
        "overview",
        "Icarius Consulting helps growth-minded companies build marketing systems that align brand, content, and go-to-market execution.",
    ),
    (
        "services",
        "We support strategy sprints, messaging playbooks, RevOps advisory, and enablement to keep revenue teams in sync.",
    ),
    (
        "process",
        "Kick off with a discovery call, partner on focused roadmaps, then iterate with measurable experiments and continuous feedback.",
    ),
];

static CLIENT_RULES: Lazy<ValidationOptions> = Lazy::new(|| {
    ValidationOptions::default()
        .with_message(Field::Name, "Please share your name.")
        .with_message(Field::Email, "Enter a valid email address.")
        .with_message(Field::Message, "Tell us a bit more so we can help.")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: Author,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFormInput {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

/// The floating chat panel: a transcript, canned answers and a lead form.
#[derive(Debug)]
pub struct ChatPanel {
    open: bool,
    transcript: Vec<ChatMessage>,
    values: LeadFormInput,
    status: FormStatus,
    submitting: bool,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanel {
    pub fn new() -> Self {
        let mut panel = Self {
            open: false,
            transcript: Vec::new(),
            values: LeadFormInput::default(),
            status: FormStatus::default(),
            submitting: false,
        };
        panel.say(Author::Bot, GREETING);
        panel
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn values(&self) -> &LeadFormInput {
        &self.values
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Flips the panel, or forces it to `expanded`. Returns the new state.
    pub fn toggle(&mut self, expanded: Option<bool>) -> bool {
        self.open = expanded.unwrap_or(!self.open);
        self.open
    }

    /// Answers a quick-reply button. Unknown keys are ignored.
    pub fn quick_reply(&mut self, key: &str, button_label: &str) -> bool {
        let Some((_, response)) = CANNED_RESPONSES.iter().find(|(k, _)| *k == key) else {
            return false;
        };
        self.say(Author::User, button_label.trim());
        self.say(Author::Bot, response);
        true
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.values.name = value,
            Field::Email => self.values.email = value,
            Field::Message => self.values.message = value,
            Field::Company => self.values.company = value,
        }
    }

    pub fn begin_submit(&mut self) -> Option<LeadRequest> {
        if self.submitting {
            return None;
        }
        let fields = SubmissionFields {
            name: sanitize_strict(&self.values.name),
            email: sanitize_strict(&self.values.email),
            message: sanitize_strict(&self.values.message),
            company: sanitize_strict(&self.values.company),
        };
        let errors = validate(&fields, &CLIENT_RULES);
        if !errors.is_empty() {
            self.status.set(errors.joined(), Some(Tone::Error));
            return None;
        }

        self.status.set("Sending your note...", None);
        self.submitting = true;
        Some(LeadRequest {
            name: fields.name,
            email: fields.email,
            company: fields.company,
            message: fields.message,
        })
    }

    pub fn finish_submit(&mut self, outcome: Result<(), SubmitError>) {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                self.say(Author::Bot, ACKNOWLEDGEMENT);
                self.status
                    .set("Message sent successfully.", Some(Tone::Success));
                self.values = LeadFormInput::default();
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Chatbot submission failed");
                let message = e.server_message().unwrap_or(FALLBACK_ERROR).to_string();
                self.status.set(message, Some(Tone::Error));
            }
        }
    }

    pub async fn submit(&mut self, client: &SiteClient) {
        if let Some(request) = self.begin_submit() {
            let outcome = client.save_chat_request(&request).await;
            self.finish_submit(outcome);
        }
    }

    fn say(&mut self, author: Author, text: &str) {
        self.transcript.push(ChatMessage {
            author,
            text: text.to_string(),
        });
    }
}
