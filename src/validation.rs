use regex::Regex;
use std::sync::OnceLock;

use crate::errors::AppError;
use crate::models::Lead;

/// Validate email format.
///
/// Checks for a minimal length, the presence of `@` and `.`, and then matches
/// a simplified RFC 5322 pattern (`local@domain.tld`).
pub fn is_valid_email(email: &str) -> bool {
    // Basic checks
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let email_regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("valid email regex")
    });

    if !email_regex.is_match(email) {
        tracing::warn!("❌ Invalid email format: {}", email);
        return false;
    }

    true
}

/// Field-level checks applied after the body has been deserialized.
///
/// With `strict_email` off any email text is accepted.
pub fn validate_lead(lead: &Lead, strict_email: bool) -> Result<(), AppError> {
    if strict_email && !is_valid_email(&lead.email) {
        return Err(AppError::Validation(format!(
            "email: '{}' is not a valid email address",
            lead.email
        )));
    }
    Ok(())
}
