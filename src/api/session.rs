//! Role gate for the protected API scopes.
//!
//! The gates read the session token from the [`SESSION_COOKIE`] cookie, verify it, then compare
//! the session's role with the one required by the scope. On success, the token's [`Claims`] are
//! stored in the request extensions for handlers to use.

use std::any::type_name;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::HttpMessage;
use log::debug;

use crate::auth::session::{Claims, SessionKeys, SESSION_COOKIE};
use crate::auth::Role;
use crate::Error;

/// Middleware letting through requests with a session of role [`User`](Role::User) or above.
pub async fn require_user<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> actix_web::Result<ServiceResponse<EitherBody<B>>>
where
    B: MessageBody,
{
    require_role(req, next, Role::User).await
}

/// Middleware letting through requests with a session of role [`Admin`](Role::Admin).
pub async fn require_admin<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> actix_web::Result<ServiceResponse<EitherBody<B>>>
where
    B: MessageBody,
{
    require_role(req, next, Role::Admin).await
}

async fn require_role<B>(
    req: ServiceRequest,
    next: Next<B>,
    required: Role,
) -> actix_web::Result<ServiceResponse<EitherBody<B>>>
where
    B: MessageBody,
{
    match authorize(&req, required) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        },
        Err(error) => {
            debug!("Rejected {} {}: {}", req.method(), req.path(), error);
            Ok(req.error_response(error).map_into_right_body())
        },
    }
}

/// Returns the claims of the request's session if its role allows `required`.
pub fn authorize(req: &ServiceRequest, required: Role) -> crate::Result<Claims> {
    let keys = req
        .app_data::<Data<SessionKeys>>()
        .ok_or(Error::MissingAppData { type_name: type_name::<SessionKeys>() })?;
    let cookie = req.cookie(SESSION_COOKIE).ok_or(Error::Unauthenticated)?;
    let claims = keys.verify(cookie.value())?;

    if claims.role.allows(required) {
        Ok(claims)
    } else {
        Err(Error::Forbidden { required })
    }
}
