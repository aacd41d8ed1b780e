use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LoanbookError;
use crate::LoanbookResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Admin,
    Client,
}

#[derive(Clone, PartialEq)]
struct Credentials {
    user_id: String,
    user_type: UserType,
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("user_type", &self.user_type)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Caller-owned authentication state.
///
/// Acquired by [`Session::login`] after a successful authentication and
/// released by [`Session::logout`] or [`Session::invalidate`] when the
/// token is rejected upstream. Not serializable, and the token never
/// appears in `Debug` output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    credentials: Option<Credentials>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session::default()
    }

    pub fn login(
        &mut self,
        user_id: impl Into<String>,
        user_type: UserType,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> LoanbookResult<()> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(LoanbookError::invalid(
                "access_token",
                "Access token cannot be empty",
            ));
        }
        let user_id = user_id.into();
        log::debug!("session acquired for {user_id} ({user_type:?})");
        self.credentials = Some(Credentials {
            user_id,
            user_type,
            access_token,
            expires_at,
        });
        Ok(())
    }

    pub fn logout(&mut self) {
        if let Some(c) = self.credentials.take() {
            log::debug!("session released for {}", c.user_id);
        }
    }

    /// Drop credentials after the backend reported the token as invalid.
    pub fn invalidate(&mut self) {
        if let Some(c) = self.credentials.take() {
            log::warn!("session for {} invalidated by upstream", c.user_id);
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.user_id.as_str())
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.credentials.as_ref().map(|c| c.user_type)
    }

    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.bearer_token(now).is_ok()
    }

    /// Token to attach to outbound requests.
    pub fn bearer_token(&self, now: DateTime<Utc>) -> LoanbookResult<&str> {
        match &self.credentials {
            None => Err(LoanbookError::Unauthenticated(
                "requesting a bearer token".into(),
            )),
            Some(c) if now >= c.expires_at => Err(LoanbookError::SessionExpired {
                user_id: c.user_id.clone(),
            }),
            Some(c) => Ok(c.access_token.as_str()),
        }
    }
}
