//! # Request Context
//!
//! The authenticated caller of a request. The session middleware in `lib-web`
//! inserts a [`Ctx`] into request extensions when a valid session token is
//! presented; handlers extract it either as `Ctx` (session required, rejects
//! with [`AppError::Unauthorized`]) or as `Option<Ctx>` (session optional).

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::error::{AppError, Result};
use crate::model::store::models::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ctx {
    account_id: i64,
    role: Role,
}

impl Ctx {
    pub fn new(account_id: i64, role: Role) -> Self {
        Self { account_id, role }
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with `Unauthorized` unless the caller is an administrator.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> OptionalFromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Ctx>().cloned())
    }
}
