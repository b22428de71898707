// src/client/session.rs
use std::sync::Arc;

use tracing::{debug, warn};

use super::api::{ClientResult, NewsClient};
use super::cache::{CacheError, LocalCache};
use crate::model::PublicUser;

pub const TOKEN_KEY: &str = "token";

/// Client-held bearer token plus the user it resolved to.
///
/// Logged-in state is derived only from the presence of a stored token; there is
/// no server-side revocation, logging out just forgets it.
pub struct Session {
    client: NewsClient,
    cache: Arc<dyn LocalCache>,
    user: Option<PublicUser>,
}

impl Session {
    pub fn new(client: NewsClient, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            client,
            cache,
            user: None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.cache.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn user(&self) -> Option<&PublicUser> {
        self.user.as_ref()
    }

    /// Re-check the stored token. Any failure discards it and leaves the
    /// session anonymous.
    pub async fn refresh(&mut self) -> Option<&PublicUser> {
        let Some(token) = self.token() else {
            self.user = None;
            return None;
        };
        match self.client.me(&token).await {
            Ok(user) => {
                debug!(user_id = %user.id, "session restored");
                self.user = Some(user);
            }
            Err(e) => {
                warn!(error = %e, "stored token rejected; continuing anonymously");
                self.user = None;
                if let Err(e) = self.cache.remove(TOKEN_KEY) {
                    warn!(error = %e, "failed to discard token");
                }
            }
        }
        self.user.as_ref()
    }

    pub async fn signup(&mut self, email: &str, password: &str) -> ClientResult<PublicUser> {
        let resp = self.client.signup(email, password).await?;
        self.adopt(resp.token, resp.user)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<PublicUser> {
        let resp = self.client.login(email, password).await?;
        self.adopt(resp.token, resp.user)
    }

    fn adopt(&mut self, token: String, user: PublicUser) -> ClientResult<PublicUser> {
        if let Err(e) = self.cache.set(TOKEN_KEY, token) {
            // Still usable for this process.
            warn!(error = %e, "failed to persist token");
        }
        self.user = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), CacheError> {
        self.user = None;
        self.cache.remove(TOKEN_KEY)
    }
}
