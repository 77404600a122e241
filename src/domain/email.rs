use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately loose: `local@domain.tld`, no whitespace, exactly one `@`.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}
