/// The four authentication operations
///
/// [`AuthService`] joins a [`CredentialStore`] with a [`SessionRegistry`]
/// and returns plain [`CoreResult`]s. Translation into protocol statuses
/// happens in [`crate::rpc`].

use kanban_shared::auth::password::{hash_password, validate_password_strength, verify_password};
use kanban_shared::error::{CoreError, CoreResult};
use kanban_shared::ids::UserId;
use kanban_shared::session::{SessionRegistry, SessionStore};

use crate::credentials::CredentialStore;

pub struct AuthService<C, S> {
    credentials: C,
    sessions: SessionRegistry<S>,
}

impl<C, S> AuthService<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    pub fn new(credentials: C, sessions: SessionRegistry<S>) -> Self {
        Self {
            credentials,
            sessions,
        }
    }

    /// Logs a user in
    ///
    /// Unknown users and wrong passwords both fail with `WrongCredentials`.
    pub async fn create_session(&self, user_id: UserId, password: &str) -> CoreResult<String> {
        self.verify(user_id, password).await?;
        let session_id = self.sessions.create(user_id).await?;

        tracing::info!(user_id = %user_id, "User logged in");
        Ok(session_id)
    }

    /// Owner of a live session, `WrongCredentials` otherwise
    pub async fn check_session(&self, session_id: &str) -> CoreResult<UserId> {
        match self.sessions.check(session_id).await {
            Err(CoreError::NotFound(_)) => Err(CoreError::WrongCredentials),
            other => other,
        }
    }

    /// Logs a session out; unknown sessions are fine
    pub async fn delete_session(&self, session_id: &str) -> CoreResult<()> {
        self.sessions.kill(session_id).await
    }

    /// Changes the password of the session's user and ends their other
    /// sessions
    ///
    /// # Errors
    ///
    /// - `WrongCredentials`: session not live or old password wrong
    /// - `Validation`: new password fails the strength rules
    pub async fn change_password(
        &self,
        session_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> CoreResult<()> {
        let user_id = self.check_session(session_id).await?;
        self.verify(user_id, old_password).await?;
        validate_password_strength(new_password).map_err(CoreError::Validation)?;

        let hash = hash_password(new_password)?;
        if !self.credentials.set_password_hash(user_id, &hash).await? {
            return Err(CoreError::WrongCredentials);
        }

        let displaced = self.sessions.displace(session_id, user_id).await?;
        tracing::info!(user_id = %user_id, displaced, "Password changed");
        Ok(())
    }

    async fn verify(&self, user_id: UserId, password: &str) -> CoreResult<()> {
        let hash = self
            .credentials
            .password_hash(user_id)
            .await?
            .ok_or(CoreError::WrongCredentials)?;

        if verify_password(password, &hash)? {
            Ok(())
        } else {
            tracing::warn!(user_id = %user_id, "Password mismatch");
            Err(CoreError::WrongCredentials)
        }
    }
}
