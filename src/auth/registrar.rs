use std::sync::Arc;

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{NewAppUser, Role};
use crate::store::CredentialStore;

/// Creates new credential records.
pub struct Registrar {
    store: Arc<dyn CredentialStore>,
}

impl Registrar {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Validates the new account and persists it with a hashed password.
    ///
    /// Fails with `DuplicateUsername` when the username is taken,
    /// `UnknownRole` when `role_name` names no known role, and
    /// `RoleNotConfigured` when the role is known but has no backing record
    /// in the store.
    pub async fn register(
        &self,
        username: &str,
        raw_password: &str,
        role_name: &str,
    ) -> Result<(), AppError> {
        if self.store.exists_by_username(username).await? {
            return Err(AppError::DuplicateUsername(username.to_string()));
        }

        let role = Role::from_value(role_name)
            .ok_or_else(|| AppError::UnknownRole(role_name.to_string()))?;

        let record = self
            .store
            .find_role(role)
            .await?
            .ok_or_else(|| AppError::RoleNotConfigured(role_name.to_string()))?;

        let password_hash = hash_password(raw_password)?;

        self.store
            .save_user(NewAppUser {
                username: username.to_string(),
                password_hash,
                role_id: record.id,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::store::memory::MemoryCredentialStore;

    #[actix_rt::test]
    async fn test_register_stores_hashed_password() {
        let store = Arc::new(MemoryCredentialStore::new());
        let registrar = Registrar::new(store.clone());

        registrar
            .register("lmontoya", "Linda123*", "user")
            .await
            .unwrap();

        let saved = store.find_by_username("lmontoya").await.unwrap().unwrap();
        assert_eq!(saved.username, "lmontoya");
        assert_eq!(saved.role, Role::User);
        // The raw password is never stored; only a hash that verifies.
        assert_ne!(saved.password_hash, "Linda123*");
        assert!(verify_password("Linda123*", &saved.password_hash).unwrap());
    }

    #[actix_rt::test]
    async fn test_duplicate_username_is_rejected() {
        let store = Arc::new(MemoryCredentialStore::new());
        let registrar = Registrar::new(store);

        registrar
            .register("lmontoya", "Linda123*", "user")
            .await
            .unwrap();

        // Regardless of password or role validity.
        match registrar.register("lmontoya", "Other456!", "admin").await {
            Err(AppError::DuplicateUsername(name)) => assert_eq!(name, "lmontoya"),
            other => panic!("expected DuplicateUsername, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_unknown_role_is_rejected() {
        let store = Arc::new(MemoryCredentialStore::new());
        let registrar = Registrar::new(store);

        match registrar.register("newuser", "Pass123!", "superuser").await {
            Err(AppError::UnknownRole(role)) => assert_eq!(role, "superuser"),
            other => panic!("expected UnknownRole, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_role_is_case_insensitive() {
        let store = Arc::new(MemoryCredentialStore::new());
        let registrar = Registrar::new(store.clone());

        registrar
            .register("newadmin", "Pass123!", "ADMIN")
            .await
            .unwrap();

        let saved = store.find_by_username("newadmin").await.unwrap().unwrap();
        assert_eq!(saved.role, Role::Admin);
    }

    #[actix_rt::test]
    async fn test_known_role_without_backing_record() {
        // A store where the admin role was never configured.
        let store = Arc::new(MemoryCredentialStore::with_roles(vec![
            crate::models::RoleRecord {
                id: 1,
                name: Role::User,
            },
        ]));
        let registrar = Registrar::new(store);

        match registrar.register("newadmin", "Pass123!", "admin").await {
            Err(AppError::RoleNotConfigured(role)) => assert_eq!(role, "admin"),
            other => panic!("expected RoleNotConfigured, got {:?}", other),
        }
    }
}
