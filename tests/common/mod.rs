// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::Response,
    Router,
};
use fitcoach::backend::MemoryAuth;
use fitcoach::config::Config;
use fitcoach::db::{Database, MemoryStore};
use fitcoach::routes::create_router;
use fitcoach::session::SessionRegistry;
use fitcoach::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Router plus handles on the in-memory backend behind it.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub auth: Arc<MemoryAuth>,
    pub store: Arc<MemoryStore>,
}

/// Create a test app on the in-memory backend.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> TestApp {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    create_test_app_with_config(config)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let auth = Arc::new(MemoryAuth::new());
    let store = Arc::new(MemoryStore::new());
    let db = Database::new(store.clone());
    let sessions = Arc::new(SessionRegistry::new(
        auth.clone(),
        db.clone(),
        config.session_idle_timeout,
        config.max_sessions,
    ));

    let state = Arc::new(AppState {
        config,
        db,
        sessions,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        auth,
        store,
    }
}

impl TestApp {
    /// A browser with an empty cookie jar.
    #[allow(dead_code)]
    pub fn browser(&self) -> Browser {
        Browser {
            router: self.router.clone(),
            cookies: Vec::new(),
        }
    }
}

/// Response pieces tests look at.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        set_cookie_headers(&self.headers)
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Minimal cookie-carrying client over the router.
#[allow(dead_code)]
pub struct Browser {
    router: Router,
    cookies: Vec<(String, String)>,
}

#[allow(dead_code)]
impl Browser {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, body).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        self.store_cookies(&response);
        into_test_response(response).await
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.retain(|(n, _)| n != name);
        self.cookies.push((name.to_string(), value.to_string()));
    }

    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/signup",
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/signin",
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Poll until the request stops answering 202 Pending.
    pub async fn get_resolved(&mut self, uri: &str) -> TestResponse {
        for _ in 0..50 {
            let response = self.get(uri).await;
            if response.status != StatusCode::ACCEPTED {
                return response;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("{uri} stayed pending");
    }

    /// Poll the session endpoint until it is no longer loading.
    pub async fn resolved_session(&mut self) -> TestResponse {
        for _ in 0..50 {
            let response = self.get("/api/session").await;
            if response.body["loading"] == false {
                return response;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("session stayed loading");
    }

    fn store_cookies(&mut self, response: &Response) {
        for raw in set_cookie_headers(response.headers()) {
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            self.cookies.retain(|(n, _)| n != name);
            let expired = raw.contains("Max-Age=0");
            if !expired {
                self.cookies.push((name.to_string(), value.to_string()));
            }
        }
    }
}

#[allow(dead_code)]
pub fn set_cookie_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

async fn into_test_response(response: Response) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}
