//! Session middleware.
//!
//! Wrap any scope or resource with [`SessionMiddlewareFactory`] to require a valid session token in the
//! `mdl_access_token` header. Valid claims are placed in the request extensions, where handlers pick them up as
//! [`SessionClaims`]. Requests without a valid token get a 401 Unauthorized response.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::{SessionClaims, TokenIssuer, SESSION_TOKEN_HEADER},
    errors::{AuthError, ServerError},
};

pub struct SessionMiddlewareFactory {
    issuer: TokenIssuer,
}

impl SessionMiddlewareFactory {
    pub fn new(issuer: TokenIssuer) -> Self {
        SessionMiddlewareFactory { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SessionMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionMiddlewareService { issuer: self.issuer.clone(), service: Rc::new(service) })
    }
}

pub struct SessionMiddlewareService<S> {
    issuer: TokenIssuer,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = read_claims(&self.issuer, &req);
        Box::pin(async move {
            let claims = claims.map_err(ServerError::AuthenticationError)?;
            trace!("🔐️ Session for user #{} accepted", claims.user_id);
            req.extensions_mut().insert::<SessionClaims>(claims);
            service.call(req).await
        })
    }
}

fn read_claims(issuer: &TokenIssuer, req: &ServiceRequest) -> Result<SessionClaims, AuthError> {
    let token = req.headers().get(SESSION_TOKEN_HEADER).ok_or(AuthError::MissingToken)?;
    let token = token.to_str().map_err(|e| {
        debug!("🔐️ Could not read session token. {e}");
        AuthError::PoorlyFormattedToken(e.to_string())
    })?;
    issuer.verify(token).map_err(|e| {
        debug!("🔐️ Session token rejected. {e}");
        e
    })
}
