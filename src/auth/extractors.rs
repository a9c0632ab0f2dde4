use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::context::SecurityContext;
use crate::error::AppError;
use crate::models::AuthenticatedUser;

/// Extracts the identity the authentication gate attached to this request.
///
/// Taking `CurrentUser` as a handler argument is what makes a route
/// protected: the gate itself never rejects anything, so a request that
/// arrived without a usable token reaches this extractor unauthenticated
/// and is turned away here with a 401 and an `{error, message, path}` body.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match SecurityContext::from_request(req).identity() {
            Some(identity) => ready(Ok(CurrentUser(identity))),
            None => {
                let err = AppError::AuthenticationRequired(req.path().to_string());
                ready(Err(err.into()))
            }
        }
    }
}
