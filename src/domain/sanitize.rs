/// How aggressively free text is cleaned before it reaches a validator,
/// the fallback store or the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// Drops ASCII control characters (0x00-0x1F, 0x7F).
    Standard,
    /// Drops control characters and the markup-significant `<` and `>`.
    Strict,
}

impl Sanitizer {
    pub fn clean(&self, raw: &str) -> String {
        let strict = matches!(self, Sanitizer::Strict);
        let kept: String = raw
            .chars()
            .filter(|&c| !is_ascii_control(c) && !(strict && (c == '<' || c == '>')))
            .collect();
        kept.trim().to_owned()
    }

    /// Coerces an arbitrary JSON value to text first. Absent and `null` values
    /// become the empty string.
    pub fn clean_value(&self, value: Option<&serde_json::Value>) -> String {
        match value {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => self.clean(s),
            Some(other) => self.clean(&other.to_string()),
        }
    }
}

fn is_ascii_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}')
}

pub fn sanitize(raw: &str) -> String {
    Sanitizer::Standard.clean(raw)
}

pub fn sanitize_strict(raw: &str) -> String {
    Sanitizer::Strict.clean(raw)
}
