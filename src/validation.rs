use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// Suffix comparisons shorter than this are rejected; national numbers
/// carry at least this many digits, anything less is too ambiguous to match.
const MIN_NATIONAL_DIGITS: usize = 7;

/// Strip everything but digits from a phone number.
///
/// Formatting punctuation disappears, but a typed country prefix survives
/// as leading digits; [`phones_match`] is what treats `"+34 612-345-678"`
/// and `"612345678"` as the same line.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// True when two phone numbers denote the same line.
///
/// Digit strings must be equal, or one must equal the other with a leading
/// country code prepended (suffix match). The shorter side has to look like
/// a full national number ([`MIN_NATIONAL_DIGITS`]) so stray short digit
/// runs never match. Blank values never match anything.
#[must_use]
pub fn phones_match(a: &str, b: &str) -> bool {
    let a = normalize_phone(a);
    let b = normalize_phone(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    short.len() >= MIN_NATIONAL_DIGITS && long.ends_with(short.as_str())
}

/// Lowercase and trim an email address for comparison.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a client or requester name
    pub fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Name cannot be empty"));
        }

        if name.len() > 100 {
            return Err(anyhow!("Name too long (max 100 characters)"));
        }

        // Check for potentially dangerous characters
        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(anyhow!("Name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate phone number format
    pub fn validate_phone(phone: &str) -> Result<()> {
        if phone.trim().is_empty() {
            return Err(anyhow!("Phone number cannot be empty"));
        }

        let digits = normalize_phone(phone).len();
        if !(7..=15).contains(&digits) {
            return Err(anyhow!("Phone number must be between 7 and 15 digits"));
        }

        // Only digits and common formatting characters are allowed
        if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '))
        {
            return Err(anyhow!("Phone number contains invalid characters"));
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(anyhow!("Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(anyhow!("Email too long (max 254 characters)"));
        }

        // Basic email validation
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return Err(anyhow!("Email must have exactly one @ symbol"));
        }

        let local_part = parts[0];
        let domain_part = parts[1];

        if local_part.is_empty() || local_part.len() > 64 {
            return Err(anyhow!("Email local part invalid"));
        }

        if domain_part.is_empty() || !domain_part.contains('.') {
            return Err(anyhow!("Email domain invalid"));
        }

        Ok(())
    }

    /// Validate a reporting or filter date range. Appointments are scheduled
    /// ahead of time, so future dates are fine; only ordering is enforced.
    pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start > end {
            return Err(anyhow!("Start date cannot be after end date"));
        }

        let days = (end - start).num_days();
        if days > 366 * 5 {
            tracing::warn!(
                "Large date range ({} days / {:.1} years) may impact store read volume",
                days,
                days as f64 / 365.0
            );
        }

        Ok(())
    }

    /// Validate a monetary amount (price, tip or expense)
    pub fn validate_amount(amount: f64) -> Result<()> {
        if !amount.is_finite() {
            return Err(anyhow!("Amount must be a number"));
        }

        if amount < 0.0 {
            return Err(anyhow!("Amount cannot be negative"));
        }

        if amount > 100_000.0 {
            return Err(anyhow!("Amount too large (max 100,000)"));
        }

        Ok(())
    }

    /// Validate a service duration in minutes
    pub fn validate_duration(minutes: i64) -> Result<()> {
        if minutes <= 0 {
            return Err(anyhow!("Duration must be greater than 0 minutes"));
        }

        if minutes > 24 * 60 {
            return Err(anyhow!("Duration too long (max 24 hours)"));
        }

        Ok(())
    }

    /// Sanitize free-form text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}
