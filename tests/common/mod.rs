//! Shared fixtures for the integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::Mutex;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
// self
use tailor_client::{
	client::ApiClient,
	error::TransportError,
	http::{HeaderMap, HttpRequest, HttpResponse, HttpTransport, StatusCode, TransportFuture},
	registry::ServiceRegistry,
	store::{MemoryStore, TokenStore},
};

/// Mints an unsigned JWT whose `exp` sits `offset` away from now.
pub fn jwt_expiring_in(offset: Duration) -> String {
	let exp = (OffsetDateTime::now_utc() + offset).unix_timestamp();
	let payload = serde_json::json!({ "sub": "customer-42", "exp": exp });

	format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.c2lnbmF0dXJl", URL_SAFE_NO_PAD.encode(payload.to_string()))
}

/// Registers `auth` and `designs` against the same base URL.
pub fn registry_for(base_url: &str) -> ServiceRegistry {
	ServiceRegistry::builder()
		.service("auth", base_url)
		.service("designs", base_url)
		.build()
		.expect("Test registry should build.")
}

/// In-memory store seeded with `token` under the canonical key.
pub fn store_with(token: Option<&str>) -> MemoryStore {
	match token {
		Some(token) => MemoryStore::with_entries([("accessToken", token)]),
		None => MemoryStore::default(),
	}
}

/// Shares a [`MemoryStore`] with a client while keeping a handle for assertions.
pub fn shared(store: &MemoryStore) -> Arc<dyn TokenStore> {
	Arc::new(store.clone())
}

/// Buffered JSON response fixture.
pub fn json_response(status: u16, body: Value) -> HttpResponse {
	text_response(status, &body.to_string())
}

/// Buffered raw response fixture.
pub fn text_response(status: u16, body: &str) -> HttpResponse {
	HttpResponse {
		status: StatusCode::from_u16(status).expect("Status fixture should be valid."),
		headers: HeaderMap::new(),
		body: body.as_bytes().to_vec(),
	}
}

/// Transport that replays scripted outcomes in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
	script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
	requests: Mutex<Vec<HttpRequest>>,
}
impl ScriptedTransport {
	pub fn new<I>(script: I) -> Arc<Self>
	where
		I: IntoIterator<Item = Result<HttpResponse, TransportError>>,
	{
		Arc::new(Self { script: Mutex::new(script.into_iter().collect()), requests: Default::default() })
	}

	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().clone()
	}

	pub fn paths(&self) -> Vec<String> {
		self.requests.lock().iter().map(|request| request.url.path().to_owned()).collect()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		self.requests.lock().push(request);

		let next = self.script.lock().pop_front().expect("Scripted transport ran out of responses.");

		Box::pin(async move { next })
	}
}

/// Client over a [`ScriptedTransport`] with `auth` and `designs` registered.
pub fn scripted_client(
	store: &MemoryStore,
	transport: Arc<ScriptedTransport>,
) -> ApiClient<ScriptedTransport> {
	ApiClient::with_transport(registry_for("http://gateway.test"), shared(store), transport)
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
	request.headers.get(name).and_then(|value| value.to_str().ok())
}
