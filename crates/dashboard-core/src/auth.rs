//! Credential check and per-session authentication state.
//!
//! A single stored secret gates the whole dashboard. The outcome of the most
//! recent comparison lives in a [`SessionContext`] owned by the caller, so
//! nothing about authentication is process-global.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};

/// Outcome of the most recent credential comparison in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No credential has been submitted yet.
    #[default]
    Unattempted,
    /// The last submitted credential matched the secret.
    Authenticated,
    /// The last submitted credential did not match.
    Rejected,
}

/// Per-session context handed to the data and presentation layers.
#[derive(Debug, Default)]
pub struct SessionContext {
    state: AuthState,
}

impl SessionContext {
    /// Create a fresh context with no authentication attempt recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current authentication state.
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// `true` once a credential has matched.
    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Compare `credential` against `secret` and record the outcome.
    ///
    /// Once authenticated, further calls are no-ops that return `Ok`.
    pub fn authenticate(&mut self, credential: &str, secret: &str) -> Result<()> {
        if self.is_authenticated() {
            return Ok(());
        }

        if credentials_match(credential, secret) {
            info!("session authenticated");
            self.state = AuthState::Authenticated;
            Ok(())
        } else {
            warn!("rejected dashboard credential");
            self.state = AuthState::Rejected;
            Err(DashboardError::AuthenticationFailed)
        }
    }

    /// Fail with [`DashboardError::NotAuthenticated`] unless authenticated.
    pub fn require_authenticated(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(DashboardError::NotAuthenticated)
        }
    }
}

/// Compare a credential with the stored secret in constant time.
///
/// Both sides are hashed first so that the comparison always runs over
/// equal-length digests and the secret's length is not observable.
pub fn credentials_match(credential: &str, secret: &str) -> bool {
    let a = Sha256::digest(credential.as_bytes());
    let b = Sha256::digest(secret.as_bytes());
    a.as_slice().ct_eq(b.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_match() {
        assert!(credentials_match("hunter2", "hunter2"));
        assert!(!credentials_match("hunter2", "hunter3"));
        assert!(!credentials_match("hunter", "hunter2"));
        assert!(!credentials_match("", "hunter2"));
    }

    #[test]
    fn test_credentials_match_empty_and_prefix() {
        assert!(!credentials_match("", "s3cret"));
        assert!(!credentials_match("s3cret ", "s3cret"));
        assert!(credentials_match("pässwörd", "pässwörd"));
    }

    #[test]
    fn test_session_starts_unattempted() {
        let ctx = SessionContext::new();
        assert_eq!(ctx.state(), AuthState::Unattempted);
        assert!(!ctx.is_authenticated());
        assert!(matches!(
            ctx.require_authenticated(),
            Err(DashboardError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_wrong_credential_is_rejected() {
        let mut ctx = SessionContext::new();
        let err = ctx.authenticate("guess", "s3cret").unwrap_err();
        assert!(matches!(err, DashboardError::AuthenticationFailed));
        assert_eq!(ctx.state(), AuthState::Rejected);
        assert!(ctx.require_authenticated().is_err());
    }

    #[test]
    fn test_retry_after_rejection_can_succeed() {
        let mut ctx = SessionContext::new();
        let _ = ctx.authenticate("guess", "s3cret");
        ctx.authenticate("s3cret", "s3cret").expect("second attempt");
        assert_eq!(ctx.state(), AuthState::Authenticated);
        assert!(ctx.require_authenticated().is_ok());
    }

    #[test]
    fn test_authenticated_session_stays_authenticated() {
        let mut ctx = SessionContext::new();
        ctx.authenticate("s3cret", "s3cret").unwrap();
        ctx.authenticate("anything", "s3cret").unwrap();
        assert!(ctx.is_authenticated());
    }
}
