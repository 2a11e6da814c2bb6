use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid admin credentials")]
    InvalidCredentials,
    #[error("Admin login is disabled")]
    LoginDisabled,
    #[error("Session is unknown or expired")]
    InvalidSession,
}

/// Token handed to the admin UI after login and presented on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    token: Uuid,
    expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Longest session lifetime accepted, thirty days.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 30;

/// Issues and validates admin sessions. Cheap to clone.
#[derive(Clone)]
pub struct SessionAuthority {
    password_hash: Option<String>,
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
}

impl SessionAuthority {
    /// `password_hash` is a bcrypt hash; `None` disables login. The TTL is
    /// clamped to `1..=MAX_SESSION_TTL_MINUTES`.
    pub fn new(password_hash: Option<String>, ttl_minutes: i64) -> Self {
        Self {
            password_hash,
            ttl: Duration::minutes(ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn login(&self, password: &str) -> Result<AdminSession, AuthError> {
        let hash = self.password_hash.as_deref().ok_or(AuthError::LoginDisabled)?;
        match bcrypt::verify(password, hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!("Admin login refused");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "Stored admin password hash is unusable");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let expires_at = Utc::now().checked_add_signed(self.ttl).ok_or(AuthError::InvalidSession)?;
        let session = AdminSession { token: Uuid::new_v4(), expires_at };
        let mut sessions = self.sessions.write().map_err(|_| AuthError::InvalidSession)?;
        sessions.retain(|_, expires_at| *expires_at > Utc::now());
        sessions.insert(session.token, session.expires_at);
        info!(expires_at = %session.expires_at, "Admin session opened");
        Ok(session)
    }

    /// Checks that `session` was issued here, is not revoked and has not expired.
    pub fn validate(&self, session: &AdminSession) -> Result<(), AuthError> {
        let sessions = self.sessions.read().map_err(|_| AuthError::InvalidSession)?;
        match sessions.get(&session.token) {
            Some(expires_at) if *expires_at > Utc::now() => Ok(()),
            _ => Err(AuthError::InvalidSession),
        }
    }

    pub fn logout(&self, session: &AdminSession) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(&session.token);
        }
    }
}
