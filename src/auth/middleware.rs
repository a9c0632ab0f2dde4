use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::context::SecurityContext;
use crate::auth::token::TokenCodec;
use crate::models::AuthenticatedUser;
use crate::store::CredentialStore;

/// The per-request authentication gate.
///
/// Runs once for every request, before its handler: installs a fresh
/// `SecurityContext`, and if the request carries a valid bearer token whose
/// subject resolves to a stored principal, attaches the authenticated
/// identity to that context. Every failure along the way (missing header,
/// wrong scheme, undecodable token, unknown subject, expired token) leaves
/// the request unauthenticated and lets it continue; rejecting requests that
/// require authentication is the job of downstream extractors, not the gate.
pub struct AuthMiddleware {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
}

impl AuthMiddleware {
    pub fn new(codec: TokenCodec, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            store: Arc::clone(&self.store),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let codec = self.codec.clone();
        let store = Arc::clone(&self.store);

        Box::pin(async move {
            let ctx = SecurityContext::from_request(req.request());

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned);

            if let Some(token) = token {
                match codec.extract_subject(&token) {
                    Ok(subject) if !ctx.is_authenticated() => {
                        match store.find_by_username(&subject).await {
                            Ok(Some(principal)) => {
                                if codec.validate_token(&token, &principal) {
                                    ctx.attach(AuthenticatedUser::new(
                                        principal.username,
                                        principal.role,
                                    ));
                                }
                            }
                            Ok(None) => {}
                            Err(e) => {
                                // Could not authenticate; not a request failure.
                                log::debug!("credential lookup failed in auth gate: {}", e);
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::debug!("bearer token rejected: {}", e);
                    }
                }
            }

            service.call(req).await
        })
    }
}
