//! Client-held sessions. The whole session lives in a cookie sealed with
//! AES-256-GCM under a key derived from the configured secret; the server
//! keeps no session table.

use std::collections::HashMap;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::SessionConfig;

pub const SESSION_NAME: &str = "simple_session_name";
pub const USER_ID_KEY: &str = "user_id";

const NONCE_SIZE: usize = 12;
const MAX_AGE_SECS: u64 = 86400 * 30;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session cookie: the value is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("session cookie: the value is too short")]
    TooShort,
    #[error("session cookie: the value could not be decrypted")]
    Decrypt,
    #[error("session cookie: the value could not be encrypted")]
    Encrypt,
    #[error("session cookie: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("session cookie: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

/// Decoded session state for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    name: String,
    values: HashMap<String, Value>,
    is_new: bool,
}

impl Session {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: HashMap::new(),
            is_new: true,
        }
    }

    #[cfg(test)]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// `None` means "not logged in", including a `user_id` of the wrong type.
    pub fn user_id(&self) -> Option<i32> {
        self.values
            .get(USER_ID_KEY)
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
    }

    pub fn set_user_id(&mut self, id: i32) {
        self.insert(USER_ID_KEY, id);
    }
}

/// Reads and writes sealed session cookies.
pub struct SessionStore {
    cipher: Aes256Gcm,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let key = Sha256::digest(config.secret.as_bytes());
        Self {
            cipher: Aes256Gcm::new(&key),
        }
    }

    /// A missing cookie yields an empty new session; a cookie that fails to
    /// decode is an error.
    pub fn get(&self, headers: &HeaderMap, name: &str) -> Result<Session, SessionError> {
        let Some(raw) = find_cookie(headers, name) else {
            return Ok(Session::new(name));
        };
        let values = self.decode(name, raw)?;
        debug!(session = name, "session cookie decoded");
        Ok(Session {
            name: name.to_string(),
            values,
            is_new: false,
        })
    }

    /// Seals the session and appends it to `headers` as a `Set-Cookie`.
    pub fn save(&self, session: &Session, headers: &mut HeaderMap) -> Result<(), SessionError> {
        let encoded = self.encode(&session.name, &session.values)?;
        let cookie = format!(
            "{}={encoded}; Path=/; Max-Age={MAX_AGE_SECS}; HttpOnly",
            session.name
        );
        headers.append(SET_COOKIE, HeaderValue::from_str(&cookie)?);
        debug!(session = %session.name, new = session.is_new, "session cookie saved");
        Ok(())
    }

    /// The cookie name is bound in as associated data, so a value cannot be
    /// replayed under another name.
    pub fn encode(&self, name: &str, values: &HashMap<String, Value>) -> Result<String, SessionError> {
        let plaintext = serde_json::to_vec(values)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: &plaintext,
                    aad: name.as_bytes(),
                },
            )
            .map_err(|_| SessionError::Encrypt)?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(combined))
    }

    pub fn decode(&self, name: &str, value: &str) -> Result<HashMap<String, Value>, SessionError> {
        let combined = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(value)?;
        if combined.len() < NONCE_SIZE {
            return Err(SessionError::TooShort);
        }
        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: name.as_bytes(),
                },
            )
            .map_err(|_| SessionError::Decrypt)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(secret: &str) -> SessionStore {
        SessionStore::new(&SessionConfig {
            secret: secret.into(),
        })
    }

    fn cookie_header(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_cookie_gives_new_empty_session() {
        let s = store("secret");
        let session = s.get(&HeaderMap::new(), SESSION_NAME).unwrap();
        assert!(session.is_new());
        assert!(session.values.is_empty());
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn saved_session_reads_back() {
        let s = store("secret");
        let mut session = s.get(&HeaderMap::new(), SESSION_NAME).unwrap();
        session.set_user_id(42);

        let mut response = HeaderMap::new();
        s.save(&session, &mut response).unwrap();
        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("simple_session_name="));
        assert!(set_cookie.contains("HttpOnly"));

        let pair = set_cookie.split(';').next().unwrap();
        let read = s
            .get(&cookie_header(&format!("theme=dark; {pair}")), SESSION_NAME)
            .unwrap();
        assert!(!read.is_new());
        assert_eq!(read.user_id(), Some(42));
    }

    #[test]
    fn session_without_user_id_is_not_an_error() {
        let s = store("secret");
        let value = s.encode(SESSION_NAME, &HashMap::new()).unwrap();
        let read = s
            .get(&cookie_header(&format!("{SESSION_NAME}={value}")), SESSION_NAME)
            .unwrap();
        assert_eq!(read.user_id(), None);
    }

    #[test]
    fn tampered_cookie_is_rejected() {
        let s = store("secret");
        let mut values = HashMap::new();
        values.insert(USER_ID_KEY.to_string(), Value::from(1));
        let mut value = s.encode(SESSION_NAME, &values).unwrap();
        let last = value.pop().unwrap();
        value.push(if last == 'A' { 'B' } else { 'A' });

        let err = s
            .get(&cookie_header(&format!("{SESSION_NAME}={value}")), SESSION_NAME)
            .unwrap_err();
        assert!(matches!(err, SessionError::Decrypt | SessionError::Encoding(_)));
    }

    #[test]
    fn other_secret_cannot_read_cookie() {
        let value = store("secret").encode(SESSION_NAME, &HashMap::new()).unwrap();
        assert!(matches!(
            store("other").decode(SESSION_NAME, &value),
            Err(SessionError::Decrypt)
        ));
    }

    #[test]
    fn cookie_is_bound_to_its_name() {
        let s = store("secret");
        let value = s.encode("other_session", &HashMap::new()).unwrap();
        assert!(s.decode(SESSION_NAME, &value).is_err());
    }

    #[test]
    fn garbage_cookie_is_an_error() {
        let s = store("secret");
        assert!(s
            .get(&cookie_header(&format!("{SESSION_NAME}=!!!")), SESSION_NAME)
            .is_err());
        assert!(matches!(
            s.decode(SESSION_NAME, "AAAA"),
            Err(SessionError::TooShort)
        ));
    }
}
