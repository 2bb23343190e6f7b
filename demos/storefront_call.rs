//! Demonstrates an authenticated storefront call that refreshes a missing token through the
//! auth service before fetching designs, using the default reqwest transport and the
//! in-memory store.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use tailor_client::{
	client::ApiClient,
	registry::ServiceRegistry,
	store::{MemoryStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"success\":true,\"accessToken\":\"demo.eyJleHAiOjQxMDI0NDQ4MDB9.sig\"}");
		})
		.await;
	let designs_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/designs");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":\"d-1\",\"name\":\"Double-breasted navy suit\"}]");
		})
		.await;
	let registry = ServiceRegistry::builder()
		.service("auth", server.base_url())
		.service("designs", server.base_url())
		.build()?;
	let store = MemoryStore::default();
	let client = ApiClient::new(registry, Arc::new(store.clone()) as Arc<dyn TokenStore>)?;
	let designs = client.get("designs", "/designs").await?;

	println!("Designs: {designs}.");
	println!("Stored keys: {:?}.", store.snapshot().keys().collect::<Vec<_>>());

	refresh_mock.assert_async().await;
	designs_mock.assert_async().await;

	Ok(())
}
