//! Operator identity.
//!
//! The console has a single operator account. The gate verifies
//! credentials through an [`AuthProvider`], hands out opaque bearer
//! tokens, and publishes the current auth state on a watch channel so
//! connected views can react to sign-in and sign-out. Until the gate
//! has settled (finished its startup resolution) consumers should show
//! neither a signed-in nor a signed-out state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::BackofficeConfig;
use crate::error::BackofficeError;

/// The signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Operator login email.
    pub email: String,
}

/// Auth state as published to views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityState {
    /// True until the gate has resolved its initial state.
    pub settling: bool,
    /// The operator, when signed in.
    pub identity: Option<Identity>,
}

/// Credential verification boundary.
pub trait AuthProvider: Send + Sync + 'static {
    /// Verifies a credential pair.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::InvalidCredentials`] when the pair
    /// does not match.
    fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, BackofficeError>> + Send;
}

/// Fixed operator credentials from the environment.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    email: String,
    password: String,
}

impl StaticCredentials {
    /// Builds the provider from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &BackofficeConfig) -> Self {
        Self {
            email: config.admin_email.clone(),
            password: config.admin_password.clone(),
        }
    }
}

impl AuthProvider for StaticCredentials {
    async fn verify(&self, email: &str, password: &str) -> Result<Identity, BackofficeError> {
        if email == self.email && password == self.password {
            Ok(Identity {
                email: email.to_string(),
            })
        } else {
            Err(BackofficeError::InvalidCredentials)
        }
    }
}

/// Issued bearer tokens and the identities behind them.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Identity>>>,
}

impl SessionStore {
    fn issue(&self, identity: Identity) -> Result<String, BackofficeError> {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| BackofficeError::Internal("session store poisoned".to_string()))?;
        sessions.insert(token.clone(), identity);
        Ok(token)
    }

    /// Looks a bearer token up.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        self.sessions
            .read()
            .ok()
            .and_then(|sessions| sessions.get(token).cloned())
    }

    fn revoke(&self, token: &str) -> bool {
        match self.sessions.write() {
            Ok(mut sessions) => {
                sessions.remove(token);
                sessions.is_empty()
            }
            Err(_) => false,
        }
    }
}

/// Single-operator auth gate.
#[derive(Debug)]
pub struct IdentityGate<P> {
    provider: P,
    sessions: SessionStore,
    state: watch::Sender<IdentityState>,
}

impl<P: AuthProvider> IdentityGate<P> {
    /// Creates the gate in the settling state.
    #[must_use]
    pub fn new(provider: P) -> Self {
        let (state, _) = watch::channel(IdentityState {
            settling: true,
            identity: None,
        });
        Self {
            provider,
            sessions: SessionStore::default(),
            state,
        }
    }

    /// Marks startup resolution as finished. Views then see a definite
    /// signed-out state instead of the settling placeholder.
    pub fn mark_settled(&self) {
        self.state.send_modify(|s| s.settling = false);
    }

    /// Verifies credentials and issues a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::InvalidCredentials`] for a bad pair,
    /// [`BackofficeError::Internal`] if the session store is unusable.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, BackofficeError> {
        let identity = self.provider.verify(email, password).await?;
        let token = self.sessions.issue(identity.clone())?;
        self.state.send_replace(IdentityState {
            settling: false,
            identity: Some(identity),
        });
        tracing::info!(email, "operator signed in");
        Ok(token)
    }

    /// Revokes a bearer token. When the last session goes, the
    /// published state drops back to signed-out.
    pub fn logout(&self, token: &str) {
        if self.sessions.revoke(token) {
            self.state.send_replace(IdentityState {
                settling: false,
                identity: None,
            });
            tracing::info!("operator signed out");
        }
    }

    /// Resolves a bearer token to an identity.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Unauthorized`] for an unknown token.
    pub fn authenticate(&self, token: &str) -> Result<Identity, BackofficeError> {
        self.sessions
            .resolve(token)
            .ok_or(BackofficeError::Unauthorized)
    }

    /// Subscribes to auth state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<IdentityState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn gate() -> IdentityGate<StaticCredentials> {
        IdentityGate::new(StaticCredentials {
            email: "admin@example.com".to_string(),
            password: "hunter2".to_string(),
        })
    }

    #[tokio::test]
    async fn gate_starts_settling_then_resolves() {
        let gate = gate();
        let state = gate.subscribe();
        assert!(state.borrow().settling);
        assert!(state.borrow().identity.is_none());

        gate.mark_settled();
        assert!(!state.borrow().settling);
        assert!(state.borrow().identity.is_none());
    }

    #[tokio::test]
    async fn login_issues_a_usable_token() {
        let gate = gate();
        let token = gate
            .login("admin@example.com", "hunter2")
            .await
            .unwrap_or_else(|e| panic!("login: {e}"));

        let identity = gate
            .authenticate(&token)
            .unwrap_or_else(|e| panic!("authenticate: {e}"));
        assert_eq!(identity.email, "admin@example.com");

        let state = gate.subscribe();
        assert!(!state.borrow().settling);
        assert!(state.borrow().identity.is_some());
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let gate = gate();
        let result = gate.login("admin@example.com", "wrong").await;
        assert!(matches!(result, Err(BackofficeError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let gate = gate();
        let token = gate
            .login("admin@example.com", "hunter2")
            .await
            .unwrap_or_else(|e| panic!("login: {e}"));

        gate.logout(&token);
        assert!(matches!(
            gate.authenticate(&token),
            Err(BackofficeError::Unauthorized)
        ));
        assert!(gate.subscribe().borrow().identity.is_none());
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let gate = gate();
        assert!(matches!(
            gate.authenticate("nope"),
            Err(BackofficeError::Unauthorized)
        ));
    }
}
