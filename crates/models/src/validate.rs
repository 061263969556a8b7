//! Field rules shared by owners and people.

use crate::errors::ModelError;

pub fn not_blank(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.chars().count() > max {
        return Err(ModelError::Validation(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

/// Telephone numbers are 1..=12 ASCII digits.
pub fn telephone(value: &str) -> Result<(), ModelError> {
    not_blank("telephone", value)?;
    if value.len() > 12 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModelError::Validation("telephone must be up to 12 digits".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telephone_rules() {
        assert!(telephone("6085551023").is_ok());
        assert!(telephone("").is_err());
        assert!(telephone("608-555-1023").is_err());
        assert!(telephone("1234567890123").is_err());
    }

    #[test]
    fn blank_and_length() {
        assert!(not_blank("city", "  ").is_err());
        assert!(not_blank("city", "Madison").is_ok());
        assert!(max_len("city", "Madison", 3).is_err());
    }
}
