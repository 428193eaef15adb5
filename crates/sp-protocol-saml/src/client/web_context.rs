//! Web request abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Session storage shared by the requests of one browser session.
pub type SessionStore = Arc<RwLock<HashMap<String, String>>>;

/// The current HTTP request and its session.
///
/// Session writes go through `&self`; implementations use interior
/// mutability.
pub trait WebContext: Send + Sync {
    /// A query or form parameter.
    fn request_parameter(&self, name: &str) -> Option<String>;

    /// A request header. Names are case-insensitive.
    fn request_header(&self, name: &str) -> Option<String>;

    /// A session attribute.
    fn session_attribute(&self, name: &str) -> Option<String>;

    /// Stores a session attribute.
    fn set_session_attribute(&self, name: &str, value: String);

    /// Removes and returns a session attribute.
    fn remove_session_attribute(&self, name: &str) -> Option<String>;

    /// Whether the request method is POST.
    fn is_post(&self) -> bool;

    /// The full URL of the current request.
    fn full_request_url(&self) -> String;
}

/// A [`WebContext`] held entirely in memory.
///
/// Useful for tests and for adapting frameworks that have already parsed
/// the request.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWebContext {
    method: String,
    url: String,
    parameters: HashMap<String, String>,
    headers: HashMap<String, String>,
    session: SessionStore,
}

impl InMemoryWebContext {
    /// A GET request to `url`.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// A POST request to `url`.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Uses an existing session store.
    #[must_use]
    pub fn with_session(mut self, session: SessionStore) -> Self {
        self.session = session;
        self
    }

    /// The session store, to hand to the next request.
    #[must_use]
    pub fn session(&self) -> SessionStore {
        Arc::clone(&self.session)
    }
}

impl WebContext for InMemoryWebContext {
    fn request_parameter(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }

    fn request_header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn session_attribute(&self, name: &str) -> Option<String> {
        self.session.read().get(name).cloned()
    }

    fn set_session_attribute(&self, name: &str, value: String) {
        self.session.write().insert(name.to_string(), value);
    }

    fn remove_session_attribute(&self, name: &str) -> Option<String> {
        self.session.write().remove(name)
    }

    fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("POST")
    }

    fn full_request_url(&self) -> String {
        self.url.clone()
    }
}
