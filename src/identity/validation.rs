//! Input normalisation for the verification flow.

use crate::identity::IdentityError;

pub const MSG_PHONE: &str = "Please enter a valid 10-digit phone number";
pub const MSG_ID_NUMBER: &str = "Please enter a valid 12-digit ID number";
pub const MSG_OTP: &str = "Please enter a valid 6-digit OTP";
pub const MSG_FULL_NAME: &str = "Please enter a valid full name (at least 3 characters)";

/// Keep the digits of a phone number; exactly 10 must remain.
pub fn normalize_phone(input: &str) -> Result<String, IdentityError> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return Err(IdentityError::Invalid(MSG_PHONE));
    }
    Ok(digits)
}

/// Strip whitespace from an ID number; exactly 12 digits must remain.
pub fn normalize_id_number(input: &str) -> Result<String, IdentityError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() != 12 || !compact.chars().all(|c| c.is_ascii_digit()) {
        return Err(IdentityError::Invalid(MSG_ID_NUMBER));
    }
    Ok(compact)
}

pub fn check_otp(input: &str) -> Result<&str, IdentityError> {
    let code = input.trim();
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(IdentityError::Invalid(MSG_OTP));
    }
    Ok(code)
}

pub fn check_full_name(input: &str) -> Result<&str, IdentityError> {
    let name = input.trim();
    if name.chars().count() < 3 {
        return Err(IdentityError::Invalid(MSG_FULL_NAME));
    }
    Ok(name)
}
