// ============================
// crates/secure-lib/src/validation/mod.rs
// ============================
//! Input sanitization and form-field validators.
//!
//! Everything here is synchronous and infallible: sanitizers return
//! cleaned strings, validators return booleans or a structured check
//! result. Malformed input is an expected case, not an error.

use std::sync::LazyLock;

use regex::Regex;

// Common validation constants
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MIN_NAME_LENGTH: usize = 2;

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]{10,15}$").unwrap());
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-'.]{1,100}$").unwrap());

/// Inline formatting tags allowed through [`sanitize_html`].
const ALLOWED_TAGS: [&str; 6] = ["b", "i", "em", "strong", "p", "br"];

/// Strip all markup from `input` and trim surrounding whitespace.
///
/// Tag markup is dropped while its text content survives, except for
/// script and style elements whose contents are discarded wholesale.
/// An unterminated tag at the end of input swallows the remainder
/// rather than leaking it through.
pub fn sanitize_input(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = rest.find('>') else {
            rest = "";
            break;
        };

        let tag = &rest[1..end];
        rest = &rest[end + 1..];

        let name = tag_name(tag);
        if !tag.starts_with('/') && (name == "script" || name == "style") {
            rest = skip_element(rest, &name);
        }
    }

    out.push_str(rest);
    out.trim().to_string()
}

/// Sanitize rich text down to a small allow-list of inline formatting
/// tags (`b`, `i`, `em`, `strong`, `p`, `br`).
///
/// Allowed tags are re-emitted in canonical lowercase form with every
/// attribute dropped. Disallowed tags disappear but keep their text
/// content, apart from script and style whose contents are discarded.
pub fn sanitize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = rest.find('>') else {
            rest = "";
            break;
        };

        let tag = &rest[1..end];
        rest = &rest[end + 1..];

        let closing = tag.starts_with('/');
        let name = tag_name(tag);

        if name == "br" {
            out.push_str("<br />");
        } else if ALLOWED_TAGS.contains(&name.as_str()) {
            out.push('<');
            if closing {
                out.push('/');
            }
            out.push_str(&name);
            out.push('>');
        } else if !closing && (name == "script" || name == "style") {
            rest = skip_element(rest, &name);
        }
    }

    out.push_str(rest);
    out
}

/// Lowercased element name of a raw tag body (the text between `<`
/// and `>`), ignoring a leading slash and anything after the name.
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Skip past the closing tag of `name`, dropping the element content.
/// With no closing tag in sight the rest of the input goes with it.
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    // ASCII lowercasing preserves byte offsets.
    let lower = rest.to_ascii_lowercase();
    let Some(pos) = lower.find(&format!("</{name}")) else {
        return "";
    };
    match rest[pos..].find('>') {
        Some(end) => &rest[pos + end + 1..],
        None => "",
    }
}

/// Validate an email address shape, after sanitization.
pub fn validate_email(email: &str) -> bool {
    let sanitized = sanitize_input(email);
    EMAIL_REGEX.is_match(&sanitized) && sanitized.len() <= MAX_EMAIL_LENGTH
}

/// Validate a phone number: 10 to 15 digits with optional spacing,
/// dashes, parentheses and a leading `+`.
pub fn validate_phone(phone: &str) -> bool {
    let sanitized = sanitize_input(phone);
    PHONE_REGEX.is_match(&sanitized)
}

/// Validate a person name: latin letters plus space, hyphen,
/// apostrophe and dot, between 2 and 100 characters.
pub fn validate_name(name: &str) -> bool {
    let sanitized = sanitize_input(name);
    NAME_REGEX.is_match(&sanitized) && sanitized.len() >= MIN_NAME_LENGTH
}

/// Outcome of a password strength check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    pub is_valid: bool,
    pub message: &'static str,
}

/// Check password strength, reporting the first failing rule.
///
/// Rules run in a fixed order (length, lowercase, uppercase, digit) so
/// the same password always yields the same message.
pub fn validate_password(password: &str) -> PasswordCheck {
    if password.len() < MIN_PASSWORD_LENGTH {
        return PasswordCheck {
            is_valid: false,
            message: "Password must be at least 8 characters long",
        };
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return PasswordCheck {
            is_valid: false,
            message: "Password must contain at least one lowercase letter",
        };
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return PasswordCheck {
            is_valid: false,
            message: "Password must contain at least one uppercase letter",
        };
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return PasswordCheck {
            is_valid: false,
            message: "Password must contain at least one number",
        };
    }
    PasswordCheck {
        is_valid: true,
        message: "Password is strong",
    }
}
