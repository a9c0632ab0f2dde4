use std::cell::RefCell;
use std::rc::Rc;

use actix_web::{HttpMessage, HttpRequest};

use crate::models::AuthenticatedUser;

/// The request-scoped slot holding "who is making this request".
///
/// One `SecurityContext` exists per request, created by the authentication
/// gate before anything else runs and dropped with the request, so no
/// identity can leak between requests that reuse an execution context. The
/// slot is set-once: the first identity attached wins and later attempts are
/// ignored.
#[derive(Default)]
pub struct SecurityContext {
    identity: RefCell<Option<AuthenticatedUser>>,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an identity unless one is already present. Returns whether
    /// the identity was stored.
    pub fn attach(&self, identity: AuthenticatedUser) -> bool {
        let mut slot = self.identity.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(identity);
        true
    }

    pub fn identity(&self) -> Option<AuthenticatedUser> {
        self.identity.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// The context stored in the request's extensions, installing a fresh
    /// one if the gate has not run (e.g. routes mounted without it).
    pub fn from_request(req: &HttpRequest) -> Rc<SecurityContext> {
        if let Some(ctx) = req.extensions().get::<Rc<SecurityContext>>() {
            return Rc::clone(ctx);
        }
        let ctx = Rc::new(SecurityContext::new());
        req.extensions_mut().insert(Rc::clone(&ctx));
        ctx
    }
}
