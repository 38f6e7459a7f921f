use std::sync::Arc;

use async_trait::async_trait;
use axum_login::{AuthUser, AuthnBackend, UserId};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{Role, User};
use crate::storage::{StorageError, UserStorage};
use crate::store::UniverseStore;

impl AuthUser for User {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.email.as_bytes()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpCredentials {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(
        email(message = "Please enter a valid SRM email address"),
        custom = "validate_srm_email"
    )]
    pub srm_email: String,
    #[validate(email(message = "Please enter a valid personal email address"))]
    pub personal_email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 10, message = "Phone number must be at least 10 characters"))]
    pub phone: String,
    #[validate(length(min = 2, message = "Department is required"))]
    pub department: String,
    #[validate(length(min = 1, message = "Section is required"))]
    pub section: String,
    pub role: Role,
}

fn validate_srm_email(value: &str) -> Result<(), ValidationError> {
    if value.ends_with("@srmist.edu.in") {
        Ok(())
    } else {
        let mut error = ValidationError::new("srm_email");
        error.message = Some("Email must end with @srmist.edu.in".into());
        Err(error)
    }
}

#[derive(Debug, Clone)]
pub enum Credentials {
    Login(LoginCredentials),
    SignUp(SignUpCredentials),
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("User not found")]
    UnknownUser,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Auth backend over the in-process store. There is no credential
/// verification anywhere: login fabricates a user record for whatever email
/// was typed and assigns a role by coin flip; signup takes the form at face
/// value. The resulting record is written through the storage port so it
/// survives until logout.
#[derive(Clone)]
pub struct Backend {
    store: Arc<UniverseStore>,
    storage: Arc<dyn UserStorage>,
}

impl Backend {
    pub fn new(store: Arc<UniverseStore>, storage: Arc<dyn UserStorage>) -> Self {
        Self { store, storage }
    }

    fn fabricate_user(creds: &LoginCredentials) -> User {
        let id = Uuid::new_v4();
        // Coin flip off the fresh id's entropy, standing in for whatever a
        // real directory lookup would return.
        let role = if id.as_bytes()[0] % 2 == 0 {
            Role::User
        } else {
            Role::Organizer
        };
        let name = creds
            .email
            .split('@')
            .next()
            .unwrap_or(&creds.email)
            .to_string();

        User {
            id,
            email: creds.email.clone(),
            name,
            role,
            department: "Computer Science".to_string(),
            phone: "9876543210".to_string(),
            srm_email: "sample@srmist.edu.in".to_string(),
            personal_email: creds.email.clone(),
            section: "C".to_string(),
        }
    }

    fn signed_up_user(creds: &SignUpCredentials) -> User {
        User {
            id: Uuid::new_v4(),
            email: creds.email.clone(),
            name: creds.name.clone(),
            role: creds.role,
            department: creds.department.clone(),
            phone: creds.phone.clone(),
            srm_email: creds.srm_email.clone(),
            personal_email: creds.personal_email.clone(),
            section: creds.section.clone(),
        }
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = User;
    type Credentials = Credentials;
    type Error = BackendError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let user = match creds {
            Credentials::Login(login) => Self::fabricate_user(&login),
            Credentials::SignUp(signup) => Self::signed_up_user(&signup),
        };

        debug!(user = %user.id, role = ?user.role, "creating session user");
        self.store.upsert_user(user.clone());
        self.storage.save(&user)?;

        Ok(Some(user))
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        self.store
            .user(*user_id)
            .map(Some)
            .ok_or(BackendError::UnknownUser)
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileStorage;

    fn backend() -> (Backend, JsonFileStorage) {
        let path = std::env::temp_dir().join(format!("universe_auth_{}.json", Uuid::new_v4()));
        let storage = JsonFileStorage::new(path);
        let backend = Backend::new(Arc::new(UniverseStore::new()), Arc::new(storage.clone()));
        (backend, storage)
    }

    #[tokio::test]
    async fn login_accepts_any_credentials_and_persists_the_user() {
        let (backend, storage) = backend();
        let creds = Credentials::Login(LoginCredentials {
            email: "priya@example.com".to_string(),
            password: "whatever".to_string(),
        });
        let user = backend.authenticate(creds).await.unwrap().unwrap();
        assert_eq!(user.name, "priya");
        assert_eq!(user.email, "priya@example.com");

        // Written through the storage port and resolvable by id afterwards.
        assert_eq!(storage.load().unwrap().unwrap().id, user.id);
        let fetched = backend.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        storage.clear().unwrap();
    }

    #[tokio::test]
    async fn signup_honors_the_chosen_role() {
        let (backend, storage) = backend();
        let creds = Credentials::SignUp(SignUpCredentials {
            name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            srm_email: "priya@srmist.edu.in".to_string(),
            personal_email: "priya@example.com".to_string(),
            password: "supersecret".to_string(),
            phone: "9876543210".to_string(),
            department: "CSE".to_string(),
            section: "C".to_string(),
            role: Role::Organizer,
        });
        let user = backend.authenticate(creds).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Organizer);
        assert_eq!(user.name, "Priya Sharma");
        storage.clear().unwrap();
    }

    #[test]
    fn signup_rejects_non_srm_addresses() {
        let creds = SignUpCredentials {
            name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            srm_email: "priya@gmail.com".to_string(),
            personal_email: "priya@example.com".to_string(),
            password: "supersecret".to_string(),
            phone: "9876543210".to_string(),
            department: "CSE".to_string(),
            section: "C".to_string(),
            role: Role::User,
        };
        let errors = creds.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("srm_email"));
    }
}
