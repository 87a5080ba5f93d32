//! Declarative role checks.
//!
//! A handler states the role it needs in its signature, e.g.
//! `Authorized(session, _): Authorized<AdminOnly>`, and the extractor
//! rejects the request before the handler body runs.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};
use shelf_http::AppError;
use shelf_kernel::AppState;

use crate::{role::Role, session::Session};

/// Minimum role a route demands, plus the message shown to callers who lack it.
pub trait Policy: Send + Sync + 'static {
    const REQUIRED: Role;
    const DENIED: &'static str;
}

/// Any signed-in account.
pub struct Authenticated;

impl Policy for Authenticated {
    const REQUIRED: Role = Role::User;
    const DENIED: &'static str = "Unauthorized";
}

/// Catalogue management.
pub struct AdminOnly;

impl Policy for AdminOnly {
    const REQUIRED: Role = Role::Admin;
    const DENIED: &'static str = "Forbidden: Admins only";
}

/// Apply `P` to an already extracted session.
pub fn authorize<P: Policy>(session: &Session) -> Result<(), AppError> {
    if session.role.satisfies(P::REQUIRED) {
        Ok(())
    } else {
        let required = P::REQUIRED;
        tracing::warn!(
            user_id = session.user_id,
            role = %session.role,
            required = %required,
            "role check failed"
        );
        Err(AppError::forbidden(P::DENIED))
    }
}

/// A session that passed policy `P`.
pub struct Authorized<P>(pub Session, pub PhantomData<P>);

impl<P> Authorized<P> {
    pub fn session(&self) -> &Session {
        &self.0
    }
}

impl<P: Policy> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        authorize::<P>(&session)?;
        Ok(Self(session, PhantomData))
    }
}

/// Owner-only mutation check: the caller must be the recorded creator.
pub fn ensure_owner(session: &Session, owner_id: i64, denied: &str) -> Result<(), AppError> {
    if session.user_id == owner_id {
        Ok(())
    } else {
        tracing::warn!(
            user_id = session.user_id,
            owner_id,
            "ownership check failed"
        );
        Err(AppError::forbidden(denied))
    }
}
