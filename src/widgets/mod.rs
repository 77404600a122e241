//! Rust renditions of the site's browser widgets. They hold the same state the
//! page scripts keep in the DOM and talk to the API through [`SiteClient`].
mod booking_cta;
mod chat_panel;
mod contact_form;
mod site_client;

pub use booking_cta::{
    render, with_plan, CtaProps, CtaVariant, CtaView, LoadingState, Resolution, OBSERVED_INPUTS,
};
pub use chat_panel::{Author, ChatMessage, ChatPanel, LeadFormInput};
pub use contact_form::{ContactForm, ContactFormInput};
pub use site_client::{ContactRequest, LeadRequest, SiteClient, SubmitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Error => "error",
        }
    }
}

/// The status line under a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub message: String,
    pub tone: Option<Tone>,
}

impl FormStatus {
    fn set(&mut self, message: impl Into<String>, tone: Option<Tone>) {
        self.message = message.into();
        self.tone = tone;
    }

    fn clear(&mut self) {
        self.set("", None);
    }

    /// `base` followed by the tone, if any.
    pub fn class_name(&self, base: &str) -> String {
        [base, self.tone.map(|t| t.as_str()).unwrap_or_default()]
            .into_iter()
            .filter(|class| !class.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
