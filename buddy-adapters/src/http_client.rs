//! HTTPS transport shared by the provider adapters.

use std::sync::Arc;
use std::time::Duration;

use hyper::body::{Bytes, to_bytes};
use hyper::client::HttpConnector;
use hyper::header::{CONTENT_TYPE, RETRY_AFTER};
use hyper::http::request::Builder;
use hyper::{Body, Client, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::{AdapterError, AdapterResult};

type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// One provider's client: endpoint, deadline and a display name for errors.
#[derive(Clone)]
pub(crate) struct ProviderHttp {
    client: HyperClient,
    provider: &'static str,
    endpoint: Uri,
    deadline: Duration,
}

impl std::fmt::Debug for ProviderHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHttp")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl ProviderHttp {
    /// `endpoint` is the full URL minus any query string.
    pub(crate) fn new(
        provider: &'static str,
        endpoint: &str,
        deadline: Duration,
    ) -> AdapterResult<Self> {
        let endpoint = endpoint.parse::<Uri>().map_err(|err| {
            AdapterError::configuration(format!("invalid {provider} endpoint {endpoint}: {err}"))
        })?;
        Ok(Self {
            client: https_client(),
            provider,
            endpoint,
            deadline,
        })
    }

    #[cfg(test)]
    pub(crate) const fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Posts `payload` as JSON to the endpoint and decodes the reply.
    ///
    /// `headers` adds provider-specific headers such as credentials.
    pub(crate) async fn call<P, R, F>(&self, payload: &P, headers: F) -> AdapterResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
        F: FnOnce(Builder) -> Builder,
    {
        let provider = self.provider;

        let body = serde_json::to_vec(payload).map_err(|err| {
            AdapterError::invalid_request(format!("cannot encode {provider} request: {err}"))
        })?;
        let request = headers(hyper::Request::post(self.endpoint.clone()).header(CONTENT_TYPE, "application/json"))
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("cannot build {provider} request: {err}"))
            })?;

        let deadline = self.deadline;
        let response = tokio::time::timeout(deadline, self.client.request(request))
            .await
            .map_err(|_| {
                AdapterError::transport(format!("{provider} did not answer within {deadline:?}"))
            })?
            .map_err(|err| AdapterError::transport(format!("{provider}: {err}")))?;

        let status = response.status();
        let retry_after = retry_after(response.headers().get(RETRY_AFTER));
        let bytes = to_bytes(response.into_body())
            .await
            .map_err(|err| AdapterError::transport(format!("{provider} body interrupted: {err}")))?;
        debug!(provider, %status, bytes = bytes.len(), "provider responded");

        check_status(provider, status, retry_after, &bytes)?;

        serde_json::from_slice(&bytes).map_err(|err| {
            AdapterError::response(format!("cannot decode {provider} response: {err}"))
        })
    }
}

fn https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));
    let tls = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    // Plain http stays allowed for local Ollama and test servers.
    let mut http = HttpConnector::new();
    http.enforce_http(false);

    Client::builder().build::<_, Body>(HttpsConnector::from((http, Arc::new(tls))))
}

fn retry_after(value: Option<&hyper::header::HeaderValue>) -> Option<Duration> {
    value
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn check_status(
    provider: &str,
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &Bytes,
) -> AdapterResult<()> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AdapterError::RateLimited { retry_after });
    }
    if status.is_success() {
        return Ok(());
    }
    Err(AdapterError::response(format!(
        "{provider} returned {status}: {}",
        String::from_utf8_lossy(body).trim()
    )))
}

/// Normalises a base URL to an absolute `http(s)` URL ending in `/`.
pub(crate) fn sanitize_base_url(input: &str) -> AdapterResult<String> {
    let trimmed = input.trim();
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(AdapterError::configuration(format!(
            "base URL {trimmed:?} must start with http:// or https://"
        )));
    }
    let base = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    base.parse::<Uri>().map_err(|err| {
        AdapterError::configuration(format!("invalid base URL {base:?}: {err}"))
    })?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_requires_scheme() {
        let err = sanitize_base_url("generativelanguage.googleapis.com").unwrap_err();
        assert!(matches!(err, AdapterError::Configuration { .. }));
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let base = sanitize_base_url(" https://example.com/openai ").unwrap();
        assert_eq!(base, "https://example.com/openai/");
    }

    #[test]
    fn status_mapping() {
        let body = Bytes::from_static(b" model not loaded \n");
        assert!(check_status("Ollama", StatusCode::OK, None, &body).is_ok());

        let err =
            check_status("Ollama", StatusCode::INTERNAL_SERVER_ERROR, None, &body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected provider response: \
             Ollama returned 500 Internal Server Error: model not loaded"
        );

        let err = check_status(
            "OpenAI",
            StatusCode::TOO_MANY_REQUESTS,
            Some(Duration::from_secs(2)),
            &body,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(2)
        ));
    }

    #[test]
    fn retry_after_accepts_seconds_only() {
        let secs = hyper::header::HeaderValue::from_static(" 12 ");
        assert_eq!(retry_after(Some(&secs)), Some(Duration::from_secs(12)));
        let date = hyper::header::HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(retry_after(Some(&date)), None);
        assert_eq!(retry_after(None), None);
    }
}
