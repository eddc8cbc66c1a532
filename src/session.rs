//! Operator sessions
//!
//! Mutating routes take an [`Operator`] argument. The only way to obtain one
//! is from a privileged [`Session`], and a session is only privileged when the
//! request presented the configured admin token. Content stores never see
//! any of this; the gate lives entirely at the HTTP boundary.

use crate::api::ApiError;
use crate::config::{resolve_secret, GatewayConfig};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;

/// Configured admin token. Without one no session can become privileged.
#[derive(Clone, Default)]
pub struct AdminToken(Option<Arc<str>>);

impl AdminToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(Arc::from(token)))
        }
    }

    /// Token resolved from the env var named by `admin_token_ref`
    pub fn from_config(config: &GatewayConfig) -> Self {
        match resolve_secret(&config.admin_token_ref) {
            Some(token) => Self::new(token),
            None => {
                tracing::warn!(
                    "{} not set, mutating API routes are disabled",
                    config.admin_token_ref
                );
                Self(None)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    fn verify(&self, presented: &str) -> bool {
        match &self.0 {
            Some(expected) => constant_time_eq(expected.as_bytes(), presented.as_bytes()),
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = if self.is_configured() { "****" } else { "<unset>" };
        f.debug_tuple("AdminToken").field(&shown).finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Who is making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    privileged: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { privileged: false }
    }

    /// Privileged iff `presented` matches the configured token
    pub fn authenticate(token: &AdminToken, presented: Option<&str>) -> Self {
        Self {
            privileged: presented.map_or(false, |p| token.verify(p)),
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Operator capability, only for privileged sessions
    pub fn operator(&self) -> Option<Operator> {
        self.privileged.then_some(Operator { _private: () })
    }
}

/// Proof of a privileged session
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    _private: (),
}

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    AdminToken: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = AdminToken::from_ref(state);
        Ok(Session::authenticate(&token, bearer(parts)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Operator
where
    AdminToken: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = AdminToken::from_ref(state);
        Session::authenticate(&token, bearer(parts))
            .operator()
            .ok_or_else(|| ApiError::unauthorized("Operator token required"))
    }
}
