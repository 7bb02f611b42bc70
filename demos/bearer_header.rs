//! Demonstrates resolving a cached bearer header through the request binder with the default
//! reqwest transport and an in-memory token cache.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use idm_token_supplier::{
	binder::RequestAuthBinder,
	credential::CredentialDescriptor,
	issuer::ReqwestTokenIssuer,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let descriptor =
		CredentialDescriptor::client_credentials(server.base_url(), "demo-client", "super-secret")?;
	let issuer = ReqwestTokenIssuer::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let binder = RequestAuthBinder::new(descriptor, Arc::new(issuer));
	let first = binder.authorization_header(None).await?;
	let second = binder.authorization_header(None).await?;

	println!("Reusable bearer header: {first}.");

	assert_eq!(first, second);

	token_mock.assert_calls_async(1).await;

	Ok(())
}
