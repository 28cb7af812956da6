use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;

use super::password::{self, PasswordError};

const PASSWORD_MIN_LEN: usize = 6;
const PASSWORD_MAX_LEN: usize = 100;

/// Account entity. Knows nothing about persistence; repositories do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Plaintext, only ever set on the way in.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[sqlx(default)]
    pub password: String,
    #[serde(skip)]
    pub encrypted_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every rule the entity broke, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}.", parts.join("; "))
    }
}

const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$"
        )
        .unwrap();
    }
    let Some((local, _)) = email.rsplit_once('@') else {
        return false;
    };
    email.len() <= EMAIL_MAX_LEN && local.len() <= EMAIL_LOCAL_MAX_LEN && EMAIL_RE.is_match(email)
}

impl User {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Password may be empty only when an encrypted one is already present
    /// (a user loaded from a store).
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.email.is_empty() {
            errors.push(FieldError {
                field: "email",
                message: "cannot be blank",
            });
        } else if !is_valid_email(&self.email) {
            errors.push(FieldError {
                field: "email",
                message: "must be a valid email address",
            });
        }

        if self.password.is_empty() {
            if self.encrypted_password.is_empty() {
                errors.push(FieldError {
                    field: "password",
                    message: "cannot be blank",
                });
            }
        } else {
            let len = self.password.chars().count();
            if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
                errors.push(FieldError {
                    field: "password",
                    message: "the length must be between 6 and 100",
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Hashes a pending plaintext password into `encrypted_password`.
    /// The plaintext is left in place; see [`User::sanitize`].
    pub fn before_create(&mut self) -> Result<(), PasswordError> {
        if !self.password.is_empty() {
            self.encrypted_password = password::hash_password(&self.password)?;
        }
        Ok(())
    }

    pub fn sanitize(&mut self) {
        self.password.clear();
    }

    pub fn compare_passwords(&self, candidate: &str) -> bool {
        password::verify_password(candidate, &self.encrypted_password)
    }

    #[cfg(test)]
    pub fn fixture() -> Self {
        Self::new("user@example.org", "password")
    }
}
