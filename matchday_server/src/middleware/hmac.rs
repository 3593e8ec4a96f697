//! HMAC middleware for Actix Web.
//!
//! The identity provider signs the profile it posts to `/auth/session` with a secret shared with this server. The
//! signature is the base64-encoded HMAC-SHA256 of the request body, sent in the `X-Identity-Hmac-SHA256` header.
//!
//! Requests with a missing or wrong signature are rejected with 403 Forbidden before they reach the handler.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use matchday_common::Secret;

use crate::{
    errors::{AuthError, ServerError},
    helpers::verify_hmac,
};

pub const IDENTITY_HMAC_HEADER: &str = "X-Identity-Hmac-SHA256";

pub struct HmacMiddlewareFactory {
    hmac_header: String,
    key: Secret<String>,
    // If false, then the middleware will not check the HMAC signature and always allow the call
    enabled: bool,
}

impl HmacMiddlewareFactory {
    pub fn new(hmac_header: &str, key: Secret<String>, enabled: bool) -> Self {
        HmacMiddlewareFactory { hmac_header: hmac_header.into(), key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            hmac_header: self.hmac_header.clone(),
            key: self.key.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    hmac_header: String,
    key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.reveal().clone();
        let hmac_header = self.hmac_header.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            if !enabled {
                trace!("🔐️ Identity HMAC checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let body = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Could not read the identity payload: {e:?}");
                ServerError::InvalidRequestBody(e.to_string())
            })?;
            let signature = req.headers().get(&hmac_header).and_then(|v| v.to_str().ok());
            check_signature(&secret, signature, &body).map_err(ServerError::AuthenticationError)?;
            trace!("🔐️ Identity signature ✅️");
            req.set_payload(bytes_to_payload(body));
            service.call(req).await
        })
    }
}

/// The signature is the base64 HMAC-SHA256 of the raw body. The comparison runs in constant time.
fn check_signature(secret: &str, signature: Option<&str>, body: &[u8]) -> Result<(), AuthError> {
    let signature = signature.ok_or_else(|| {
        warn!("🔐️ No identity signature found in request. Denying access.");
        AuthError::InvalidIdentitySignature
    })?;
    let tag = base64::decode(signature.trim()).map_err(|e| {
        warn!("🔐️ Identity signature is not valid base64. {e}");
        AuthError::InvalidIdentitySignature
    })?;
    if verify_hmac(secret.as_bytes(), body, &tag) {
        Ok(())
    } else {
        warn!("🔐️ Invalid identity signature found in request. Denying access.");
        Err(AuthError::InvalidIdentitySignature)
    }
}

// The body has already been consumed by the signature check, so it is handed back to the handler here
fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
