// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Browser session cookie.
//!
//! The `fitcoach_session` cookie is an HS256 JWT whose subject is the
//! server-side session ID. Requests without a valid cookie, or whose session
//! has been evicted, get a fresh session and a new cookie.

use crate::session::ClientSession;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_COOKIE: &str = "fitcoach_session";
/// Readable by page scripts; only says "someone is signed in here".
pub const LOGGED_IN_COOKIE: &str = "fitcoach_logged_in";

const SESSION_TOKEN_DAYS: u64 = 30;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Server-side session ID
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// The browser session a request belongs to.
#[derive(Clone)]
pub struct CurrentSession(pub Arc<ClientSession>);

/// Sign a session ID into a cookie value.
pub fn create_session_token(session_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session_id.to_string(),
        iat: now,
        exp: now + (SESSION_TOKEN_DAYS * 24 * 60 * 60) as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Session ID from a cookie value, if the signature and expiry check out.
pub fn decode_session_token(token: &str, signing_key: &[u8]) -> Option<String> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims.sub)
        .ok()
}

pub fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_TOKEN_DAYS as i64))
        .build()
}

pub fn logged_in_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((LOGGED_IN_COOKIE, "1"))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_TOKEN_DAYS as i64))
        .build()
}

/// Expire every cookie this service sets, with the attributes it set them with.
pub fn expire_app_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.remove(session_cookie(String::new(), secure))
        .remove(logged_in_cookie(secure))
}

/// Resolve the request's browser session, creating one if needed.
pub async fn attach_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let key = &state.config.session_signing_key;

    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_session_token(cookie.value(), key))
        .and_then(|sid| state.sessions.get(&sid));

    let (session, fresh) = match existing {
        Some(session) => (session, false),
        None => (state.sessions.create(), true),
    };
    let session_id = session.id.clone();

    request.extensions_mut().insert(CurrentSession(session));
    let response = next.run(request).await;

    // Handlers may end the session (logout); don't hand out a cookie for it.
    if !fresh || !state.sessions.contains(&session_id) {
        return response;
    }

    match create_session_token(&session_id, key) {
        Ok(token) => {
            let jar = CookieJar::new().add(session_cookie(token, state.config.secure_cookies()));
            (jar, response).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to sign session cookie");
            state.sessions.remove(&session_id);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_session_key_32_bytes_min!!!";

    #[test]
    fn test_token_round_trip() {
        let token = create_session_token("abc", KEY).unwrap();
        assert_eq!(decode_session_token(&token, KEY).as_deref(), Some("abc"));
    }

    #[test]
    fn test_token_wrong_key_rejected() {
        let token = create_session_token("abc", KEY).unwrap();
        assert_eq!(decode_session_token(&token, b"another_key_entirely_0123456789"), None);
        assert_eq!(decode_session_token("garbage", KEY), None);
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims {
            sub: "abc".to_string(),
            iat: 1,
            exp: 2,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();
        assert_eq!(decode_session_token(&token, KEY), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let session = session_cookie("v".into(), true).to_string();
        assert!(session.contains("HttpOnly"));
        assert!(session.contains("SameSite=Lax"));
        assert!(session.contains("Secure"));
        assert!(session.contains("Path=/"));

        let hint = logged_in_cookie(false).to_string();
        assert!(!hint.contains("HttpOnly"));
        assert!(!hint.contains("Secure"));
    }
}
