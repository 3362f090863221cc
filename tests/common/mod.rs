#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use filepicker_relay::{
    app,
    config::Config,
    services::{
        relay::SHARED_REFRESH_SLOT,
        token_store::{MemoryTokenStore, TokenStore},
    },
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{Match, MockServer, Request as WireRequest, ResponseTemplate};

pub const CLIENT_ID: &str = "test_client_id";
pub const CLIENT_SECRET: &str = "test_client_secret";
pub const FILE_PICKER_HOST: &str = "https://picker.example.test";
pub const REDIRECT_URI: &str = "http://localhost:8008/callback";
pub const TOKEN_PATH: &str = "/oauth/token";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryTokenStore>,
    pub server: MockServer,
}

impl TestApp {
    pub async fn start() -> Self {
        Self::start_with(&[]).await
    }

    /// Extra variables override the test defaults.
    pub async fn start_with(extra: &[(&str, &str)]) -> Self {
        let server = MockServer::start().await;
        let config = config_for(&server, extra);
        Self::from_config(server, config)
    }

    pub fn from_config(server: MockServer, config: Config) -> Self {
        let store = Arc::new(MemoryTokenStore::new());
        let state = app::build_state_with_store(&config, store.clone()).unwrap();
        let router = app::build_router(state, &config);

        Self {
            router,
            store,
            server,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn callback(&self, query: &str) -> Response<Body> {
        let req = Request::get(format!("/callback?{query}"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn refresh(&self) -> Response<Body> {
        let req = Request::post("/refresh?id_token=old-id&username=alice")
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn cached_refresh_token(&self) -> Option<String> {
        self.store.get(SHARED_REFRESH_SLOT).await.unwrap()
    }
}

pub fn config_for(server: &MockServer, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("CLIENT_ID", CLIENT_ID.to_string()),
        ("CLIENT_SECRET", CLIENT_SECRET.to_string()),
        ("AUTH_SERVER_HOST", server.uri()),
        ("FILE_PICKER_HOST", FILE_PICKER_HOST.to_string()),
        ("REDIRECT_URI", REDIRECT_URI.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Same settings as `config_for`, with a sub-second upstream timeout.
pub fn config_with_timeout(server: &MockServer, timeout: Duration) -> Config {
    let mut config = config_for(server, &[]);
    let mut oauth = (*config.oauth).clone();
    oauth.upstream_timeout = timeout;
    config.oauth = Arc::new(oauth);
    config
}

/// Matches a form-urlencoded body field.
pub struct FormField(pub &'static str, pub String);

pub fn form(name: &'static str, value: impl Into<String>) -> FormField {
    FormField(name, value.into())
}

impl Match for FormField {
    fn matches(&self, request: &WireRequest) -> bool {
        url::form_urlencoded::parse(&request.body).any(|(k, v)| k == self.0 && v == self.1)
    }
}

pub fn token_body(access: &str, refresh: Option<&str>, id: &str) -> ResponseTemplate {
    let mut body = json!({
        "access_token": access,
        "id_token": id,
        "token_type": "Bearer",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    ResponseTemplate::new(200).set_body_json(body)
}

pub async fn body_json(res: Response<Body>) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location_query(res: &Response<Body>) -> (url::Url, HashMap<String, String>) {
    let location = res.headers()["location"].to_str().unwrap();
    let url = url::Url::parse(location).unwrap();
    let params = url.query_pairs().into_owned().collect();
    (url, params)
}
