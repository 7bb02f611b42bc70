//! Shared helpers for integration tests.

// std
use std::sync::Arc;
// self
use idm_token_supplier::{
	binder::RequestAuthBinder,
	credential::CredentialDescriptor,
	issuer::ReqwestTokenIssuer,
	reqwest::Client as ReqwestClient,
};

/// Builds a reqwest-backed issuer that accepts the self-signed certificates produced by
/// `httpmock` during tests.
pub fn insecure_issuer() -> ReqwestTokenIssuer {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestTokenIssuer::with_client(client)
}

/// Constructs a [`RequestAuthBinder`] wired to the insecure test transport.
#[allow(dead_code)]
pub fn build_test_binder(default_credentials: CredentialDescriptor) -> RequestAuthBinder {
	RequestAuthBinder::new(default_credentials, Arc::new(insecure_issuer()))
}
