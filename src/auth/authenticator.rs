use std::sync::Arc;

use crate::auth::context::SecurityContext;
use crate::auth::password::verify_password;
use crate::auth::token::TokenCodec;
use crate::error::AppError;
use crate::models::AuthenticatedUser;
use crate::store::CredentialStore;

/// Turns a username/password pair into a bearer token.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Verifies the credentials against the store and, on success, attaches
    /// the authenticated identity to the request's security context and
    /// returns a freshly minted token.
    ///
    /// An unknown username and a wrong password both fail with
    /// `InvalidCredentials`, so the response cannot be used to probe which
    /// usernames exist. Any other failure in the pipeline is wrapped into
    /// `AuthError` with its message preserved.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        ctx: &SecurityContext,
    ) -> Result<String, AppError> {
        let user = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| AppError::AuthError(e.to_string()))?
            .ok_or(AppError::InvalidCredentials)?;

        let matches = verify_password(password, &user.password_hash)
            .map_err(|e| AppError::AuthError(e.to_string()))?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        ctx.attach(AuthenticatedUser::new(user.username.clone(), user.role));

        self.codec
            .mint(&user.username)
            .map_err(|e| AppError::AuthError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::models::{NewAppUser, Role};
    use crate::store::memory::MemoryCredentialStore;

    async fn store_with_user(username: &str, password: &str) -> Arc<MemoryCredentialStore> {
        let store = Arc::new(MemoryCredentialStore::new());
        store
            .save_user(NewAppUser {
                username: username.to_string(),
                password_hash: hash_password(password).unwrap(),
                role_id: 1,
            })
            .await
            .unwrap();
        store
    }

    fn codec() -> TokenCodec {
        TokenCodec::new("authenticator-test-secret-for-hs256", 3600)
    }

    #[actix_rt::test]
    async fn test_authenticate_valid_credentials() {
        let store = store_with_user("lmontoya", "Linda123*").await;
        let codec = codec();
        let authenticator = Authenticator::new(store, codec.clone());
        let ctx = SecurityContext::new();

        let token = authenticator
            .authenticate("lmontoya", "Linda123*", &ctx)
            .await
            .unwrap();

        // The token names the caller and the context now holds the identity.
        assert_eq!(codec.extract_subject(&token).unwrap(), "lmontoya");
        assert!(!codec.is_expired(&token));
        let identity = ctx.identity().unwrap();
        assert_eq!(identity.username, "lmontoya");
        assert_eq!(identity.role, Role::User);
    }

    #[actix_rt::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let store = store_with_user("lmontoya", "Linda123*").await;
        let authenticator = Authenticator::new(store, codec());
        let ctx = SecurityContext::new();

        match authenticator.authenticate("lmontoya", "wrongpass", &ctx).await {
            Err(AppError::InvalidCredentials) => {}
            other => panic!("expected InvalidCredentials, got {:?}", other),
        }
        assert!(!ctx.is_authenticated());
    }

    #[actix_rt::test]
    async fn test_unknown_username_collapses_to_invalid_credentials() {
        let store = store_with_user("lmontoya", "Linda123*").await;
        let authenticator = Authenticator::new(store, codec());
        let ctx = SecurityContext::new();

        // Indistinguishable from a wrong password.
        match authenticator.authenticate("nobody", "Linda123*", &ctx).await {
            Err(AppError::InvalidCredentials) => {}
            other => panic!("expected InvalidCredentials, got {:?}", other),
        }
    }
}
