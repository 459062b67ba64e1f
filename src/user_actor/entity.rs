use super::error::UserError;
use crate::actor_framework::Entity;
use crate::domain::{normalize_email, User, UserCreate, UserPatch};
use chrono::Utc;

fn validate_username(username: &str) -> Result<(), UserError> {
    if username.trim().is_empty() {
        return Err(UserError::ValidationError("username is required".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(UserError::ValidationError(format!("invalid email: {email:?}"))),
    }
}

impl Entity for User {
    type Id = String;
    type CreatePayload = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the user
    /// * `params` - Username, email and an already hashed credential
    fn from_create(id: String, params: UserCreate) -> Result<Self, UserError> {
        let email = normalize_email(&params.email);
        validate_username(&params.username)?;
        validate_email(&email)?;
        if params.password_hash.is_empty() {
            return Err(UserError::ValidationError("password is required".to_string()));
        }

        Ok(Self {
            id,
            username: params.username.trim().to_string(),
            email,
            password_hash: params.password_hash,
            role: params.role,
            created_at: Utc::now(),
        })
    }

    /// Username and email are unique indexes; emails compare lower-cased.
    fn check_unique(&self, existing: &Self) -> Result<(), UserError> {
        if existing.email == self.email {
            return Err(UserError::AlreadyExists(format!("email {}", self.email)));
        }
        if existing.username == self.username {
            return Err(UserError::AlreadyExists(format!("username {}", self.username)));
        }
        Ok(())
    }

    /// Updates the user's profile information.
    ///
    /// # Fields Updated
    /// - `username`, `email` (normalised), `password_hash`, `role`
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(username) = patch.username {
            validate_username(&username)?;
            self.username = username.trim().to_string();
        }
        if let Some(email) = patch.email {
            let email = normalize_email(&email);
            validate_email(&email)?;
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        Ok(())
    }

    /// Handles user-specific actions.
    ///
    /// Currently, no custom actions are defined for users.
    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
