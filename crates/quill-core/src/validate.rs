//! Request validation.
//!
//! A plain, explicitly constructed service held in application state and
//! passed where needed - no process-global validator instance.

use crate::error::DomainError;

const MIN_PASSWORD_LEN: usize = 8;

/// Validates inbound request payloads before they reach the services.
#[derive(Debug, Clone, Default)]
pub struct RequestValidator;

impl RequestValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn registration(&self, name: &str, email: &str, password: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }
        if !looks_like_email(email) {
            return Err(DomainError::Validation(
                "Invalid email address".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }

    pub fn login(&self, email: &str, password: &str) -> Result<(), DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn post_content(&self, title: &str, description: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(DomainError::Validation(
                "Title and description are required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn category_name(&self, name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Category name is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_rejects_blank_fields() {
        let v = RequestValidator::new();
        assert!(v.registration("", "a@b.io", "longenough").is_err());
        assert!(v.registration("Ann", "", "longenough").is_err());
        assert!(v.registration("Ann", "a@b.io", "").is_err());
    }

    #[test]
    fn registration_rejects_bad_email_and_short_password() {
        let v = RequestValidator::new();
        assert!(v.registration("Ann", "not-an-email", "longenough").is_err());
        assert!(v.registration("Ann", "@b.io", "longenough").is_err());
        assert!(v.registration("Ann", "a@b.io", "short").is_err());
        assert!(v.registration("Ann", "a@b.io", "longenough").is_ok());
    }

    #[test]
    fn post_content_requires_non_blank_title_and_description() {
        let v = RequestValidator::new();
        assert!(v.post_content("  ", "body").is_err());
        assert!(v.post_content("title", "\t").is_err());
        assert!(v.post_content("title", "body").is_ok());
    }
}
