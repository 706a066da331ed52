//! Access layer: the single chokepoint every remote call goes through.
//!
//! It decorates requests with the session's bearer token, classifies the
//! response and turns 401/403 into a local session teardown.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn, Span};
use url::Url;

use crate::config::ClientConfig;
use crate::contract::error::ClientError;
use crate::domain::session::SessionState;

/// Fixed API prefix appended to the configured origin.
pub const BASE_PATH: &str = "/api";

const JSON: &str = "application/json";

/// Per-call options: HTTP method, optional JSON body and extra headers.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Session-aware JSON client for the clinic API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    origin: String,
    session: Arc<SessionState>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionState>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_sec > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_sec));
        }
        let http = builder.build()?;
        Self::with_http_client(http, &config.base_url, session)
    }

    /// Use a preconfigured reqwest client (proxies, custom TLS roots, ...).
    pub fn with_http_client(
        http: reqwest::Client,
        origin: &str,
        session: Arc<SessionState>,
    ) -> Result<Self, ClientError> {
        let origin = origin.trim().trim_end_matches('/').to_string();
        Url::parse(&origin)
            .map_err(|e| ClientError::invalid_request(format!("origin '{}': {}", origin, e)))?;
        Ok(Self {
            http,
            origin,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Full endpoint URL: origin + `/api` + `path`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let raw = format!("{}{}{}", self.origin, BASE_PATH, path);
        Url::parse(&raw).map_err(|e| ClientError::invalid_request(format!("'{}': {}", raw, e)))
    }

    fn headers_for(&self, extra: HeaderMap) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));

        // Caller headers win over defaults, except Authorization which only
        // ever reflects the session.
        for (name, value) in extra.iter() {
            if name != AUTHORIZATION {
                headers.insert(name.clone(), value.clone());
            }
        }

        if let Some(token) = self.session.token().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::invalid_request("session token is not a valid header"))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Issue one request and classify the response.
    ///
    /// Resolves to `None` for 204 and non-JSON responses, and to the parsed
    /// body otherwise.
    #[instrument(
        name = "clinic_client.http.request",
        skip(self, options),
        fields(http.method = %options.method, http.path = %path, http.status_code = tracing::field::Empty)
    )]
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ClientError> {
        let url = self.endpoint(path)?;
        let headers = self.headers_for(options.headers)?;

        let mut req = self.http.request(options.method, url).headers(headers);
        if let Some(body) = &options.body {
            req = req.body(serde_json::to_vec(body)?);
        }

        let response = req.send().await?;
        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("Server rejected the session ({}), tearing it down", status);
            self.session.invalidate();
            return Err(ClientError::SessionExpired);
        }

        if !status.is_success() {
            let message = match response.text().await {
                Ok(text) if !text.trim().is_empty() => text,
                _ => status
                    .canonical_reason()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("Error {}", status.as_u16())),
            };
            debug!("API error {}: {}", status, message);
            return Err(ClientError::api(status.as_u16(), message));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON));
        if status == StatusCode::NO_CONTENT || !is_json {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(Some(value))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.request(path, RequestOptions::get()).await?;
        decode(path, body)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .request(path, RequestOptions::post(serde_json::to_value(body)?))
            .await?;
        decode(path, body)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .request(path, RequestOptions::put(serde_json::to_value(body)?))
            .await?;
        decode(path, body)
    }

    /// POST whose response body carries nothing the caller needs.
    pub async fn post_discard<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::post(serde_json::to_value(body)?))
            .await
            .map(|_| ())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(path, RequestOptions::delete()).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: Option<Value>) -> Result<T, ClientError> {
    match body {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Err(ClientError::EmptyResponse {
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::events::TracingPublisher;
    use crate::infra::storage::MemorySessionStorage;

    fn client(origin: &str) -> Result<ApiClient, ClientError> {
        let state = Arc::new(SessionState::hydrate(
            Arc::new(MemorySessionStorage::default()),
            Arc::new(TracingPublisher),
        ));
        ApiClient::with_http_client(reqwest::Client::new(), origin, state)
    }

    #[test]
    fn endpoint_joins_origin_base_path_and_path() {
        let c = client("http://localhost:8080/").unwrap();
        assert_eq!(
            c.endpoint("/pacientes/3").unwrap().as_str(),
            "http://localhost:8080/api/pacientes/3"
        );
        assert_eq!(
            c.endpoint("citas").unwrap().as_str(),
            "http://localhost:8080/api/citas"
        );
    }

    #[test]
    fn endpoint_keeps_query_string() {
        let c = client("https://clinic.example").unwrap();
        assert_eq!(
            c.endpoint("/pacientes/buscar/nombre?nombre=Ana%20Mar%C3%ADa")
                .unwrap()
                .as_str(),
            "https://clinic.example/api/pacientes/buscar/nombre?nombre=Ana%20Mar%C3%ADa"
        );
    }

    #[test]
    fn invalid_origin_is_rejected() {
        assert!(matches!(
            client("not a url"),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn default_headers_without_session() {
        let c = client("http://localhost:8080").unwrap();
        let mut extra = HeaderMap::new();
        extra.insert(AUTHORIZATION, HeaderValue::from_static("Bearer forged"));
        extra.insert("x-request-source", HeaderValue::from_static("cli"));

        let h = c.headers_for(extra).unwrap();
        assert_eq!(h.get(CONTENT_TYPE).unwrap(), JSON);
        assert_eq!(h.get("x-request-source").unwrap(), "cli");
        assert!(h.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn caller_can_override_content_type() {
        let c = client("http://localhost:8080").unwrap();
        let mut extra = HeaderMap::new();
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let h = c.headers_for(extra).unwrap();
        assert_eq!(h.get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn decode_requires_a_body() {
        let err = decode::<Vec<i64>>("/citas", None).unwrap_err();
        assert!(matches!(err, ClientError::EmptyResponse { path } if path == "/citas"));
        let ok: Vec<i64> = decode("/citas", Some(serde_json::json!([1, 2]))).unwrap();
        assert_eq!(ok, vec![1, 2]);
    }
}
