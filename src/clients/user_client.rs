use crate::actor_framework::ResourceClient;
use crate::domain::{normalize_email, Caller, Page, Role, User, UserCreate, UserPatch};
use crate::user_actor::{CredentialHasher, UserError};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Profile edit as submitted by the account owner. The password is plain text
/// and hashed here.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Client for the account store.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    hasher: Arc<dyn CredentialHasher>,
}

impl_client_methods!(UserClient, User, UserError, user);

impl UserClient {
    pub fn new(inner: ResourceClient<User>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { inner, hasher }
    }

    /// Creates an account with the `user` role.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: String, email: String, password: String) -> Result<User, UserError> {
        self.create_account(username, email, password, Role::User).await
    }

    /// Seeding path for back-office accounts.
    #[instrument(skip(self, password))]
    pub async fn register_admin(&self, username: String, email: String, password: String) -> Result<User, UserError> {
        self.create_account(username, email, password, Role::Admin).await
    }

    async fn create_account(&self, username: String, email: String, password: String, role: Role) -> Result<User, UserError> {
        if password.is_empty() {
            return Err(UserError::ValidationError("password is required".to_string()));
        }
        debug!("Sending request");
        let payload = UserCreate {
            username,
            email,
            password_hash: self.hasher.hash(&password),
            role,
        };
        let id = self.inner.create(payload).await?;
        info!(user_id = %id, %role, "Account registered");
        self.require_user(id).await
    }

    /// Verifies credentials and returns the identity the transport layer
    /// attaches to later requests.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: String, password: String) -> Result<Caller, UserError> {
        debug!("Sending request");
        let email = normalize_email(&email);
        let user = self
            .inner
            .find(move |u: &User| u.email == email)
            .await?
            .into_iter()
            .next();

        match user {
            Some(user) if self.hasher.verify(&password, &user.password_hash) => {
                info!(user_id = %user.id, "Login succeeded");
                Ok(Caller { user_id: user.id, role: user.role })
            }
            _ => {
                warn!("Login refused");
                Err(UserError::InvalidCredentials)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, caller: &Caller) -> Result<User, UserError> {
        self.require_user(caller.user_id.clone()).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, caller: &Caller, update: ProfileUpdate) -> Result<User, UserError> {
        if matches!(update.password.as_deref(), Some("")) {
            return Err(UserError::ValidationError("password must not be empty".to_string()));
        }
        debug!("Sending request");
        let patch = UserPatch {
            username: update.username,
            email: update.email,
            password_hash: update.password.map(|p| self.hasher.hash(&p)),
            role: None,
        };
        let user = self.inner.update(caller.user_id.clone(), patch).await?;
        info!("Profile updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self, caller: &Caller) -> Result<(), UserError> {
        debug!("Sending request");
        self.inner.delete(caller.user_id.clone()).await?;
        info!("Account deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, caller: &Caller, page: usize, limit: usize) -> Result<Page<User>, UserError> {
        require_admin!(caller, UserError);
        debug!("Sending request");
        let users = self.inner.find(|_: &User| true).await?;
        Ok(Page::paginate(users, page, limit))
    }

    /// Number of registered accounts, for the back-office dashboard.
    pub(crate) async fn count_users(&self) -> Result<usize, UserError> {
        debug!("Sending request");
        Ok(self.inner.find(|_: &User| true).await?.len())
    }

    #[instrument(skip(self))]
    pub async fn set_role(&self, caller: &Caller, id: String, role: Role) -> Result<User, UserError> {
        require_admin!(caller, UserError);
        debug!("Sending request");
        let patch = UserPatch { role: Some(role), ..Default::default() };
        let user = self.inner.update(id, patch).await?;
        info!(user_id = %user.id, %role, "Role changed");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, caller: &Caller, id: String) -> Result<(), UserError> {
        require_admin!(caller, UserError);
        if caller.user_id == id {
            return Err(UserError::ValidationError("admins cannot delete their own account".to_string()));
        }
        debug!("Sending request");
        self.inner.delete(id).await?;
        info!("User deleted");
        Ok(())
    }
}
