//! # Validation Utilities
//!
//! Input validation helpers. Each helper returns the user-facing message for
//! the first rule the value breaks.

/// Characters accepted as the "special character" of a password.
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?`~";

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format.
///
/// One `@`, a non-empty local part, and a dotted domain without empty labels.
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    let invalid = || Err("Invalid email format".to_string());

    let Some((local, domain)) = email.split_once('@') else {
        return invalid();
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return invalid();
    }
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return invalid();
    }
    Ok(())
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else {
        Ok(())
    }
}

/// Validate password strength: at least 6 characters, one uppercase letter
/// and one special character.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    validate_min_length(password, 6, "Password")?;

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err("Password must contain at least one special character".to_string());
    }
    Ok(())
}

/// Validate an asset or currency code such as `USDT` or `GHS`.
pub fn validate_currency_code(code: &str, field_name: &str) -> Result<(), String> {
    let code = code.trim();
    if code.len() < 2 || code.len() > 10 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Err(format!("{} must be a 2-10 character alphanumeric code", field_name))
    } else {
        Ok(())
    }
}

/// Validate that an amount is finite and strictly positive.
pub fn validate_positive_amount(value: f64, field_name: &str) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be greater than zero", field_name))
    }
}
