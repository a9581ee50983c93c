use super::types::AuthStatus;
use crate::AppError;
use crate::core::session::Identity;
use crate::error::CliError;
use crate::storage::credentials::CredentialStore;
use crate::utils::text::abbreviate_token;
use tracing::warn;

/// Resolves identities against the credential store and edits it
pub struct AuthService {
    store: CredentialStore,
}

impl AuthService {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    /// Identity for a session. A name without a stored token is reported and
    /// the session continues anonymously.
    pub fn resolve_identity(&self, name: Option<&str>) -> Identity {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Identity::Anonymous;
        };

        match self.store.token(name) {
            Some(token) => Identity::user(name.to_lowercase(), token),
            None => {
                warn!(identity = name, "Unknown authentication username, continuing unauthenticated");
                Identity::Anonymous
            }
        }
    }

    pub fn status(&self, name: &str) -> AuthStatus {
        let token = self.store.token(name);
        AuthStatus {
            identity: name.to_lowercase(),
            has_token: token.is_some(),
            token_abbrev: abbreviate_token(token),
            store_path: self.store.path().display().to_string(),
        }
    }

    pub fn set_token(&mut self, name: &str, token: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(CliError::InvalidArguments("Identity name cannot be empty".to_string()).into());
        }
        if token.trim().is_empty() {
            return Err(CliError::InvalidArguments("Access token cannot be empty".to_string()).into());
        }

        self.store.set_token(name.trim(), token);
        self.store.save()?;
        Ok(())
    }

    /// Returns whether a token was stored for `name`.
    pub fn delete(&mut self, name: &str) -> Result<bool, AppError> {
        let removed = self.store.remove(name);
        if removed {
            self.store.save()?;
        }
        Ok(removed)
    }

    pub fn identities(&self) -> Vec<&str> {
        self.store.identities()
    }
}
