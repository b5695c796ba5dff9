//! Field-level constraints shared by the record kinds.

use crate::errors::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Emails are unique case-insensitively, so every write and lookup goes through here.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Collects field violations so a write can report all of them at once.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Returns the trimmed value, or records `message` when it is absent or blank.
    pub fn required(&mut self, value: Option<&str>, message: &str) -> String {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                self.push(message);
                String::new()
            }
        }
    }

    /// Like `required`, but only for fields present in a partial update.
    pub fn not_blank(&mut self, value: Option<&str>, message: &str) -> Option<String> {
        value.map(|v| {
            let v = v.trim();
            if v.is_empty() {
                self.push(message);
            }
            v.to_string()
        })
    }

    pub fn email(&mut self, email: &str) {
        if !email.is_empty() && !email.contains('@') {
            self.push("Please provide a valid email");
        }
    }

    pub fn password(&mut self, password: &str) {
        if !password.is_empty() && password.chars().count() < MIN_PASSWORD_LEN {
            self.push(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_email_case_and_whitespace() {
        assert_eq!(normalize_email("  Bella@Test.COM "), "bella@test.com");
    }

    #[test]
    fn collects_every_violation() {
        let mut errors = FieldErrors::new();
        errors.required(None, "Name is required");
        errors.required(Some("   "), "Phone is required");
        errors.password("abc");
        match errors.finish() {
            Err(AppError::Validation(fields)) => assert_eq!(fields.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn absent_partial_fields_are_fine() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.not_blank(None, "Name cannot be empty"), None);
        assert!(errors.finish().is_ok());
    }
}
