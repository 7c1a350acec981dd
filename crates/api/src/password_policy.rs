// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rules for operator passwords.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must not be blank")]
    Blank,

    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    #[error("Password must not match the login name")]
    MatchesLogin,
}

/// Password requirements applied when an operator is created or a
/// password is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters, not bytes.
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 10 }
    }
}

impl PasswordPolicy {
    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn validate(&self, password: &str, login_name: &str) -> Result<(), PasswordPolicyError> {
        if password.trim().is_empty() {
            return Err(PasswordPolicyError::Blank);
        }
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }
        if password.trim().eq_ignore_ascii_case(login_name.trim()) {
            return Err(PasswordPolicyError::MatchesLogin);
        }
        Ok(())
    }
}
