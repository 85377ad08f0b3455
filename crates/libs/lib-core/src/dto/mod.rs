//! # Data Transfer Objects (DTOs)
//!
//! Request and response bodies of the REST API. Request types expose a
//! `validate()` that reports every failing field at once as
//! [`AppError::Validation`](crate::AppError::Validation).

pub mod admin;
pub mod auth;
pub mod kyc;
pub mod notification;
pub mod order;
pub mod wallet;

pub use admin::*;
pub use auth::*;
pub use kyc::*;
pub use notification::*;
pub use order::*;
pub use wallet::*;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, FieldError, Result};

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Collects field failures while a request is being checked.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub(crate) fn check(&mut self, field: &str, result: std::result::Result<(), String>) {
        if let Err(message) = result {
            self.0.push(FieldError::new(field, message));
        }
    }

    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub(crate) fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}
