use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const MAX_INPUT_LENGTH: usize = 1000;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// `local@domain.tld` shape check. Deliberately loose.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Strips `<` and `>` (character-level, not tag-aware), trims, and caps at
/// `MAX_INPUT_LENGTH` chars. Trailing whitespace exposed by the cap is trimmed too,
/// so running it twice gives the same string.
pub fn sanitize_str(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    let capped: String = stripped.trim().chars().take(MAX_INPUT_LENGTH).collect();
    capped.trim_end().to_string()
}

/// Non-string JSON values sanitize to an empty string.
pub fn sanitize_input(input: Option<&Value>) -> String {
    match input {
        Some(Value::String(s)) => sanitize_str(s),
        _ => String::new(),
    }
}

/// JSON truthiness as the web form sends it: missing, null, false, 0 and "" are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
