use axum_extra::extract::cookie::{Cookie, CookieJar};
use dashmap::DashMap;
use rand::distr::Alphanumeric;
use rand::Rng;
use sparql_analytics_client::SparqlClient;
use std::sync::Arc;

use crate::session::SessionState;

pub const SESSION_COOKIE: &str = "sparql-analytics-session";

/// Shared application state: the HTTP client and one [`SessionState`] per
/// browser session, keyed by the session cookie.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<DashMap<String, SessionState>>,
    pub client: SparqlClient,
    pub page_size: usize,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            client: SparqlClient::new(),
            page_size,
        }
    }

    /// Returns the id of the caller's session, creating the session and its
    /// cookie on first contact.
    pub fn ensure_session(&self, jar: CookieJar) -> (CookieJar, String) {
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            let id = cookie.value().to_owned();
            self.sessions.entry(id.clone()).or_default();
            return (jar, id);
        }
        let id: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        self.sessions.entry(id.clone()).or_default();
        let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
            .path("/")
            .http_only(true)
            .build();
        (jar.add(cookie), id)
    }

    /// Snapshot of a session for rendering; avoids holding a map guard
    /// while the page is built.
    pub fn session_snapshot(&self, id: &str) -> SessionState {
        self.sessions
            .get(id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Mutates a session in place under the map lock. The closure must not
    /// block; query execution happens outside of it.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut entry = self.sessions.entry(id.to_owned()).or_default();
        f(&mut entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_isolated_by_id() {
        let state = AppState::new(25);
        state.with_session("a", |s| s.endpoint = "http://one.example/sparql".to_owned());
        state.with_session("b", |s| s.endpoint = "http://two.example/sparql".to_owned());
        assert_eq!(state.session_snapshot("a").endpoint, "http://one.example/sparql");
        assert_eq!(state.session_snapshot("b").endpoint, "http://two.example/sparql");
    }

    #[test]
    fn ensure_session_reuses_an_existing_cookie() {
        let state = AppState::new(25);
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "fixed"));
        let (_, id) = state.ensure_session(jar);
        assert_eq!(id, "fixed");
    }
}
