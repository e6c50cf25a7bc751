// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// O papel exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
}

pub struct Admin;
impl RoleDef for Admin {
    fn role() -> UserRole { UserRole::Admin }
}

pub struct Worker;
impl RoleDef for Worker {
    fn role() -> UserRole { UserRole::Worker }
}

/// Guardião: só deixa passar quem tem o papel `R`.
/// Depende do `auth_guard` ter colocado o usuário nas extensions.
pub struct RequireRole<R>(pub PhantomData<R>);

pub fn check_role(user: Option<&AuthenticatedUser>, required: UserRole) -> Result<(), AppError> {
    match user {
        None => Err(AppError::InvalidToken),
        Some(AuthenticatedUser(profile)) if profile.role == required => Ok(()),
        Some(_) => Err(AppError::Forbidden),
    }
}

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        check_role(parts.extensions.get::<AuthenticatedUser>(), R::role())
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        Ok(RequireRole(PhantomData))
    }
}
