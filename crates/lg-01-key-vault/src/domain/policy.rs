//! # Password Policy
//!
//! Applied before a key is saved, never before it is loaded, so entries
//! written under an older policy remain readable.

use thiserror::Error;

/// Why a password was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordRejection {
    #[error("password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("password must contain at least one letter")]
    MissingLetter,

    #[error("password must contain at least one digit")]
    MissingDigit,
}

/// Password strength rules.
///
/// Length is counted in characters. Any Unicode letter or digit satisfies
/// the corresponding requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length (default: 8).
    pub min_length: usize,
    /// Maximum length (default: 128).
    pub max_length: usize,
    /// Require at least one letter (default: true).
    pub require_letter: bool,
    /// Require at least one digit (default: true).
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_letter: true,
            require_digit: true,
        }
    }
}

impl PasswordPolicy {
    /// Check `password`, reporting the first rule it breaks.
    pub fn check(&self, password: &str) -> Result<(), PasswordRejection> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordRejection::TooShort {
                min: self.min_length,
                actual: length,
            });
        }
        if length > self.max_length {
            return Err(PasswordRejection::TooLong {
                max: self.max_length,
                actual: length,
            });
        }
        if self.require_letter && !password.chars().any(char::is_alphabetic) {
            return Err(PasswordRejection::MissingLetter);
        }
        if self.require_digit && !password.chars().any(char::is_numeric) {
            return Err(PasswordRejection::MissingDigit);
        }
        Ok(())
    }

    /// True if `password` satisfies every rule.
    pub fn is_valid(&self, password: &str) -> bool {
        self.check(password).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_letters_and_digits() {
        let policy = PasswordPolicy::default();
        assert!(policy.is_valid("password1"));
        assert!(policy.is_valid("12345abc"));
    }

    #[test]
    fn test_length_bounds() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.check("Weak1"),
            Err(PasswordRejection::TooShort { min: 8, actual: 5 })
        );
        let long = format!("a1{}", "x".repeat(127));
        assert!(matches!(
            policy.check(&long),
            Err(PasswordRejection::TooLong { max: 128, .. })
        ));
        let exact = format!("a1{}", "x".repeat(126));
        assert!(policy.is_valid(&exact));
    }

    #[test]
    fn test_character_classes() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.check("12345678"), Err(PasswordRejection::MissingLetter));
        assert_eq!(policy.check("abcdefgh"), Err(PasswordRejection::MissingDigit));
    }

    #[test]
    fn test_unicode_letters_count() {
        let policy = PasswordPolicy::default();
        assert!(policy.is_valid("contraseña1"));
        assert!(policy.is_valid("пароль123"));
        // Eight characters, more than eight bytes.
        assert!(policy.is_valid("ñññññññ1"));
    }
}
