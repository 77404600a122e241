use std::collections::{BTreeMap, HashMap};

use super::is_valid_email;

pub const DEFAULT_MIN_MESSAGE_LENGTH: usize = 10;
pub const MAX_COMPANY_LENGTH: usize = 120;

/// Declaration order is reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
    Company,
}

/// Already-sanitized text fields of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFields {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: String,
}

#[derive(Debug, Clone)]
pub struct ValidationOptions {
    messages: HashMap<Field, String>,
    min_message_length: usize,
    check_company: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            messages: HashMap::new(),
            min_message_length: DEFAULT_MIN_MESSAGE_LENGTH,
            check_company: false,
        }
    }
}

impl ValidationOptions {
    pub fn with_message(mut self, field: Field, message: impl Into<String>) -> Self {
        self.messages.insert(field, message.into());
        self
    }

    pub fn min_message_length(mut self, length: usize) -> Self {
        self.min_message_length = length;
        self
    }

    pub fn check_company(mut self) -> Self {
        self.check_company = true;
        self
    }

    fn message_for(&self, field: Field) -> String {
        if let Some(custom) = self.messages.get(&field) {
            return custom.clone();
        }
        match field {
            Field::Name => "Please share your name.".to_string(),
            Field::Email => "Enter a valid email address.".to_string(),
            Field::Message if self.min_message_length > 1 => format!(
                "Please share at least {} characters.",
                self.min_message_length
            ),
            Field::Message => "Please share a short message.".to_string(),
            Field::Company => "Company name is too long.".to_string(),
        }
    }
}

/// Per-field error messages. Empty means the submission is acceptable as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    pub fn joined(&self) -> String {
        self.0.values().map(String::as_str).collect::<Vec<_>>().join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.joined())
    }
}

pub fn validate(fields: &SubmissionFields, options: &ValidationOptions) -> FieldErrors {
    let mut errors = BTreeMap::new();
    if fields.name.is_empty() {
        errors.insert(Field::Name, options.message_for(Field::Name));
    }
    if !is_valid_email(&fields.email) {
        errors.insert(Field::Email, options.message_for(Field::Email));
    }
    if fields.message.is_empty() || text_length(&fields.message) < options.min_message_length {
        errors.insert(Field::Message, options.message_for(Field::Message));
    }
    if options.check_company && text_length(&fields.company) > MAX_COMPANY_LENGTH {
        errors.insert(Field::Company, options.message_for(Field::Company));
    }
    FieldErrors(errors)
}

fn text_length(s: &str) -> usize {
    s.chars().count()
}
