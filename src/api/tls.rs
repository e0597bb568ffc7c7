//! TLS setup for the HTTP client.

use std::sync::Arc;

use rustls::RootCertStore;

/// Build a rustls client config with webpki root certificates for cross-platform compatibility
pub fn client_config() -> Result<rustls::ClientConfig, String> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| format!("Unsupported TLS protocol configuration: {}", e))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}
