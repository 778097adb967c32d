use crate::utils::error::{RaffleError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-']+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

const MAX_EMAIL_LENGTH: usize = 255;
const MAX_FULL_NAME_LENGTH: usize = 200;
const MAX_PHONE_LENGTH: usize = 20;
const MIN_PASSWORD_LENGTH: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwertyuiop", "qwerty123", "iloveyou", "sunshine", "princess", "football",
    "baseball", "welcome1", "admin123", "letmein1", "abc12345", "trustno1",
];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RaffleError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| RaffleError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RaffleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Lowercases the domain part, keeps the local part as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(RaffleError::validation("email", "This field is required."));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(RaffleError::validation(
            "email",
            format!("Ensure this field has no more than {MAX_EMAIL_LENGTH} characters."),
        ));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(RaffleError::validation("email", "Enter a valid email address."));
    }
    Ok(())
}

pub fn validate_full_name(full_name: &str) -> Result<()> {
    if full_name.trim().is_empty() {
        return Err(RaffleError::validation("full_name", "This field is required."));
    }
    if full_name.chars().count() > MAX_FULL_NAME_LENGTH {
        return Err(RaffleError::validation(
            "full_name",
            format!("Ensure this field has no more than {MAX_FULL_NAME_LENGTH} characters."),
        ));
    }
    Ok(())
}

/// Digits plus `+`, spaces and `-`; at least one digit.
pub fn validate_phone(phone: &str) -> Result<()> {
    if phone.trim().is_empty() {
        return Err(RaffleError::validation("phone", "This field is required."));
    }
    if phone.chars().count() > MAX_PHONE_LENGTH {
        return Err(RaffleError::validation(
            "phone",
            format!("Ensure this field has no more than {MAX_PHONE_LENGTH} characters."),
        ));
    }
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, '+' | ' ' | '-'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(RaffleError::validation(
            "phone",
            "Phone may only contain digits, spaces, + or -",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str, email: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(RaffleError::validation(
            "password",
            format!("This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."),
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(RaffleError::validation("password", "This password is entirely numeric."));
    }
    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(RaffleError::validation("password", "This password is too common."));
    }
    if let Some((local, _)) = email.split_once('@') {
        if !local.is_empty() && lowered == local.to_lowercase() {
            return Err(RaffleError::validation(
                "password",
                "The password is too similar to the email address.",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("mail.api_url", "https://api.brevo.com/v3/smtp/email").is_ok());
        assert!(validate_url("mail.api_url", "http://localhost:3000").is_ok());
        assert!(validate_url("mail.api_url", "").is_err());
        assert!(validate_url("mail.api_url", "invalid-url").is_err());
        assert!(validate_url("mail.api_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email(" Maria.G@Gmail.COM "), "Maria.G@gmail.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("maria.gonzalez@gmail.com").is_ok());
        assert!(validate_email("correo-invalido").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+56 9 1234-5678").is_ok());
        assert!(validate_phone("56912345678").is_ok());
        assert!(validate_phone("abc123").is_err());
        assert!(validate_phone("+ -").is_err());
        assert!(validate_phone("+569123456789012345678").is_err());
    }

    #[test]
    fn test_validate_password_rules() {
        assert!(validate_password("Corazon2025!", "maria@gmail.com").is_ok());
        assert!(validate_password("short1", "maria@gmail.com").is_err());
        assert!(validate_password("1234567890", "maria@gmail.com").is_err());
        assert!(validate_password("Password123", "maria@gmail.com").is_err());
        assert!(validate_password("mariagonzalez", "mariagonzalez@gmail.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("auth.access_token_minutes", 60, 1, 1440).is_ok());
        assert!(validate_range("auth.access_token_minutes", 0, 1, 1440).is_err());
    }
}
