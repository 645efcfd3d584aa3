// src/core/securitytxt/validators.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::models::Format;

/// Checks one field value against a syntax; `Err` carries a human-readable
/// reason.
pub type ValidateFn = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Registry of value validators keyed by [`Format`].
///
/// Starts out empty, so every value passes. Stricter checks (URL
/// well-formedness, `mailto:` syntax, language tags) can be plugged in with
/// [`FormatValidators::register`] without touching the record model.
#[derive(Clone, Default)]
pub struct FormatValidators {
    validators: HashMap<Format, ValidateFn>,
}

impl FormatValidators {
    pub fn register<F>(&mut self, format: Format, validator: F) -> &mut Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.insert(format, Arc::new(validator));
        self
    }

    /// Runs the validator for `format`. Formats without a registered
    /// validator always pass.
    pub fn validate(&self, format: Format, value: &str) -> Result<(), String> {
        match self.validators.get(&format) {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FormatValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<&str> = self.validators.keys().map(|k| k.as_ref()).collect();
        formats.sort_unstable();
        f.debug_struct("FormatValidators").field("formats", &formats).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_accepts_everything() {
        let registry = FormatValidators::default();
        for format in [Format::SecureUrl, Format::ContactUri, Format::KeyUri, Format::Rfc5646] {
            assert_eq!(registry.validate(format, "definitely not a url"), Ok(()));
        }
        assert_eq!(format!("{registry:?}"), "FormatValidators { formats: [] }");
    }

    #[test]
    fn test_registered_validator_replaces_default() {
        let mut registry = FormatValidators::default();
        registry.register(Format::SecureUrl, |v| {
            if v.starts_with("https://") { Ok(()) } else { Err("must use https".to_string()) }
        });
        assert_eq!(registry.validate(Format::SecureUrl, "https://example.com"), Ok(()));
        assert_eq!(
            registry.validate(Format::SecureUrl, "http://example.com"),
            Err("must use https".to_string())
        );
        assert_eq!(registry.validate(Format::KeyUri, "http://example.com"), Ok(()));
        assert_eq!(format!("{registry:?}"), "FormatValidators { formats: [\"secure-url\"] }");
    }
}
