//! The federation transport client (§4.2): `Get(ctx, request) -> response`
//! and `Post(ctx, request, payload) -> response`. Signs outbound requests
//! per policy, defaults headers by call kind, honors cancellation, and
//! classifies failures as transient/terminal.

use crate::signer::{AuthPolicy, Method as SignMethod, Signer};
use orb_core::cancel::CancelToken;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const ACTIVITY_STREAMS_CONTENT_TYPE: &str = "application/activity+json";
pub const LD_JSON_CONTENT_TYPE: &str = "application/ld+json";

/// Which default `Accept` header a call should carry (§4.2 "Headers").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Federation,
    Cas,
}

impl CallKind {
    fn accept(self) -> &'static str {
        match self {
            CallKind::Federation => ACTIVITY_STREAMS_CONTENT_TYPE,
            CallKind::Cas => LD_JSON_CONTENT_TYPE,
        }
    }
}

/// A transport failure, classified per §4.2/§7: 5xx and network errors are
/// transient (the caller retries with backoff); 4xx is terminal;
/// cancellation is its own non-retried case.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transient transport error: {0}")]
    Transient(String),
    #[error("terminal transport error ({status}): {message}")]
    Terminal { status: u16, message: String },
    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Terminal { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<orb_core::error::OrbError> for TransportError {
    fn from(e: orb_core::error::OrbError) -> Self {
        if e.is(orb_core::error::Kind::Cancelled) {
            TransportError::Cancelled
        } else {
            TransportError::Transient(e.to_string())
        }
    }
}

/// An outbound request: target URL, header bag, and optional bearer-token
/// scope (§4.2).
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub bearer_scope: Option<String>,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            bearer_scope: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

pub struct Transport {
    http: reqwest::Client,
    get_signer: Arc<dyn Signer>,
    post_signer: Arc<dyn Signer>,
    auth_policy: Arc<dyn AuthPolicy>,
}

impl Transport {
    pub fn new(
        get_signer: Arc<dyn Signer>,
        post_signer: Arc<dyn Signer>,
        auth_policy: Arc<dyn AuthPolicy>,
        request_timeout: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("reqwest client builder never fails with this configuration");
        Self {
            http,
            get_signer,
            post_signer,
            auth_policy,
        }
    }

    pub async fn get(
        &self,
        ctx: &CancelToken,
        request: Request,
        kind: CallKind,
    ) -> Result<Response, TransportError> {
        self.call(ctx, reqwest::Method::GET, request, &[], kind)
            .await
    }

    pub async fn post(
        &self,
        ctx: &CancelToken,
        request: Request,
        payload: &[u8],
        kind: CallKind,
    ) -> Result<Response, TransportError> {
        self.call(ctx, reqwest::Method::POST, request, payload, kind)
            .await
    }

    async fn call(
        &self,
        ctx: &CancelToken,
        method: reqwest::Method,
        mut request: Request,
        payload: &[u8],
        kind: CallKind,
    ) -> Result<Response, TransportError> {
        let url = url::Url::parse(&request.url)
            .map_err(|e| TransportError::Terminal { status: 0, message: e.to_string() })?;
        let path = url.path().to_string();

        request
            .headers
            .entry("accept".to_string())
            .or_insert_with(|| kind.accept().to_string());
        if method == reqwest::Method::POST {
            request
                .headers
                .insert("content-type".to_string(), kind.accept().to_string());
        }

        let sign_method = if method == reqwest::Method::GET {
            SignMethod::Get
        } else {
            SignMethod::Post
        };
        if self.auth_policy.requires_auth(&path, sign_method) {
            let signer: &dyn Signer = if sign_method == SignMethod::Get {
                self.get_signer.as_ref()
            } else {
                self.post_signer.as_ref()
            };
            let signed = signer
                .sign(method.as_str(), &path, &request.headers, payload)
                .map_err(TransportError::from)?;
            request.headers.extend(signed);
        }

        let mut builder = self.http.request(method, url).body(payload.to_vec());
        for (k, v) in &request.headers {
            builder = builder.header(k, v);
        }
        if let Some(scope) = &request.bearer_scope {
            builder = builder.bearer_auth(scope);
        }

        let send = builder.send();
        let response = ctx
            .race(send)
            .await
            .map_err(|_| TransportError::Cancelled)?
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    TransportError::Transient(e.to_string())
                } else {
                    TransportError::Transient(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = ctx
            .race(response.bytes())
            .await
            .map_err(|_| TransportError::Cancelled)?
            .map_err(|e| TransportError::Transient(e.to_string()))?
            .to_vec();

        if status >= 500 {
            return Err(TransportError::Transient(format!(
                "server error {status}"
            )));
        }
        if (400..500).contains(&status) {
            return Err(TransportError::Terminal {
                status,
                message: String::from_utf8_lossy(&body).to_string(),
            });
        }

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
