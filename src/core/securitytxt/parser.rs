// src/core/securitytxt/parser.rs

use crate::core::errors::ParseError;
use crate::core::models::Field;
use crate::core::securitytxt::builder::RecordBuilder;

/// Feeds every line of `message` into `builder`.
///
/// Blank lines and lines starting with `#` are skipped. A bad line is
/// recorded on the builder and parsing carries on with the next one, so a
/// mangled file (or an HTML error page) still yields whatever fields it has.
pub fn parse_message(message: &str, builder: &mut RecordBuilder<'_>) {
    for (idx, line) in message.lines().enumerate() {
        if is_skippable(line) {
            continue;
        }

        let result = parse_line(line).and_then(|field| builder.assign(&field));
        if let Err(cause) = result {
            builder.add_syntax_error(idx + 1, line, cause);
        }
    }
}

fn is_skippable(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#')
}

/// Splits one line into a [`Field`] per section 3.6.8 of RFC 5322.
///
/// The name is right-trimmed and lower-cased, the value trimmed. Both must be
/// printable US-ASCII without spaces.
pub fn parse_line(line: &str) -> Result<Field, ParseError> {
    let (name, value) = line.split_once(':').ok_or(ParseError::Separator)?;

    let key = name.trim_end().to_ascii_lowercase();
    let value = value.trim();

    if key.is_empty() || !is_vchar(&key) {
        return Err(ParseError::FieldName);
    }
    if !is_vchar(value) {
        return Err(ParseError::Value);
    }
    if value.is_empty() {
        return Err(ParseError::EmptyValue);
    }

    Ok(Field { key, value: value.to_string() })
}

/// Printable US-ASCII except space (RFC 5234 `VCHAR`).
fn is_vchar(s: &str) -> bool {
    s.chars().all(|c| ('!'..='~').contains(&c))
}
