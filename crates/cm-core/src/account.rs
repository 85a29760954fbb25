//! Authenticated identity and sign-up form checks.
//!
//! The authentication protocol belongs to the identity provider; this
//! module only holds what the session needs to know about the user and the
//! input validation done before a provider is ever called.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::UserId;

/// The currently signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignUpFormError {
    #[error("email is required")]
    EmptyEmail,

    #[error("password is required")]
    EmptyPassword,

    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Raw sign-up input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), SignUpFormError> {
        if self.email.trim().is_empty() {
            return Err(SignUpFormError::EmptyEmail);
        }
        if self.password.is_empty() {
            return Err(SignUpFormError::EmptyPassword);
        }
        if self.password != self.confirm_password {
            return Err(SignUpFormError::PasswordMismatch);
        }
        Ok(())
    }
}
