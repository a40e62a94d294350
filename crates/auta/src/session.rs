//! Per-client session state and flash messages.
//!
//! A [`Session`] holds the name of the last car the client created and a
//! queue of flash messages waiting to be shown. It travels in a signed cookie
//! handled by [`SessionCodec`]:
//!
//! ```text
//! session=<base64url(json)>.<base64url(blake3_keyed(json))>
//! ```
//!
//! Anything that fails to decode or verify is treated as an empty session.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Context string for deriving the signing key from the configured secret.
const KEY_DERIVATION_CONTEXT: &str = "auta 2024 session cookie signing key";

/// Session contents as stored in the cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_created_car_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<String>,
}

/// One client's session for the duration of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    data: SessionData,
    modified: bool,
}

impl Session {
    /// An empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the most recently created car, if any.
    #[must_use]
    pub fn last_created_car_name(&self) -> Option<&str> {
        self.data.last_created_car_name.as_deref()
    }

    /// Remember the name of a newly created car.
    pub fn set_last_created_car_name(&mut self, name: impl Into<String>) {
        self.data.last_created_car_name = Some(name.into());
        self.modified = true;
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.data.flashes.push(message.into());
        self.modified = true;
    }

    /// Messages currently queued, oldest first.
    #[must_use]
    pub fn flashes(&self) -> &[String] {
        &self.data.flashes
    }

    /// Remove and return every queued message.
    pub fn take_flashes(&mut self) -> Vec<String> {
        if self.data.flashes.is_empty() {
            return Vec::new();
        }
        self.modified = true;
        std::mem::take(&mut self.data.flashes)
    }

    /// Whether anything changed since the session was loaded.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether the session holds no state at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data == SessionData::default()
    }
}

/// Signs, verifies and (de)serializes session cookies.
#[derive(Clone)]
pub struct SessionCodec {
    key: [u8; 32],
    cookie_name: String,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// Create a codec whose signing key is derived from `secret`.
    #[must_use]
    pub fn new(secret: &str, cookie_name: impl Into<String>) -> Self {
        Self {
            key: blake3::derive_key(KEY_DERIVATION_CONTEXT, secret.as_bytes()),
            cookie_name: cookie_name.into(),
        }
    }

    /// Name of the session cookie.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Encode a session as a signed cookie value.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized.
    pub fn encode(&self, session: &Session) -> Result<String> {
        let json = serde_json::to_vec(&session.data)?;
        let payload = URL_SAFE_NO_PAD.encode(&json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()).as_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    /// Decode and verify a cookie value.
    ///
    /// Returns `None` for malformed, tampered or foreign values.
    #[must_use]
    pub fn decode(&self, value: &str) -> Option<Session> {
        let (payload, signature) = value.split_once('.')?;

        let signature: [u8; 32] = URL_SAFE_NO_PAD.decode(signature).ok()?.try_into().ok()?;
        // blake3::Hash equality is constant-time
        if self.sign(payload.as_bytes()) != blake3::Hash::from(signature) {
            return None;
        }

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let data = serde_json::from_slice(&json).ok()?;
        Some(Session {
            data,
            modified: false,
        })
    }

    /// Load the session from request headers.
    ///
    /// A missing or invalid cookie yields an empty session.
    #[must_use]
    pub fn load(&self, headers: &HeaderMap) -> Session {
        let Some(value) = self.find_cookie(headers) else {
            return Session::new();
        };

        self.decode(value).unwrap_or_else(|| {
            debug!("Ignoring session cookie that failed verification");
            Session::new()
        })
    }

    /// Build the `Set-Cookie` header value for a session, if one is needed.
    ///
    /// Unmodified sessions need no cookie. A modified session that ended up
    /// empty expires the cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized.
    pub fn set_cookie(&self, session: &Session) -> Result<Option<String>> {
        if !session.is_modified() {
            return Ok(None);
        }

        if session.is_empty() {
            return Ok(Some(format!(
                "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax",
                self.cookie_name
            )));
        }

        let value = self.encode(session)?;
        Ok(Some(format!(
            "{}={value}; Path=/; HttpOnly; SameSite=Lax",
            self.cookie_name
        )))
    }

    fn sign(&self, payload: &[u8]) -> blake3::Hash {
        blake3::keyed_hash(&self.key, payload)
    }

    fn find_cookie<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim_matches('"'))
    }
}
