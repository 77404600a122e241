mod email;
mod sanitize;
mod submission;
mod validation;

pub use email::is_valid_email;
pub use sanitize::{sanitize, sanitize_strict, Sanitizer};
pub use submission::{RawSubmission, SubmissionPayload};
pub use validation::{
    validate, Field, FieldErrors, SubmissionFields, ValidationOptions,
    DEFAULT_MIN_MESSAGE_LENGTH, MAX_COMPANY_LENGTH,
};
