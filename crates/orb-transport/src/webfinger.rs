//! A minimal WebFinger client (§4.1 scenario 2, §4.8 step 1, §6 wire
//! formats): "a resource descriptor with `links[]`, each having `rel` and
//! `href`". Used by the hashlink resolver (to find a `working-copy` CAS
//! link) and the proof monitor (to learn a witness's ledger type).

use orb_core::error::{OrbError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebFingerLink {
    pub rel: String,
    pub href: Option<String>,
    #[serde(default)]
    pub properties: std::collections::HashMap<String, Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebFingerResponse {
    pub subject: String,
    #[serde(default)]
    pub links: Vec<WebFingerLink>,
}

impl WebFingerResponse {
    pub fn link_with_rel(&self, rel: &str) -> Option<&WebFingerLink> {
        self.links.iter().find(|l| l.rel == rel)
    }
}

pub struct WebFingerClient {
    http: reqwest::Client,
}

impl WebFingerClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// GET `https://<domain>/.well-known/webfinger?resource=<resource>`.
    pub async fn resolve(&self, domain: &str, resource: &str) -> Result<WebFingerResponse> {
        let url = format!(
            "https://{domain}/.well-known/webfinger?resource={}",
            urlencoding_encode(resource)
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| OrbError::transient(format!("webfinger request failed: {e}")))?;
        if response.status().is_server_error() {
            return Err(OrbError::transient(format!(
                "webfinger {domain} returned {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(OrbError::not_found(format!(
                "webfinger {domain} returned {}",
                response.status()
            )));
        }
        response
            .json::<WebFingerResponse>()
            .await
            .map_err(|e| OrbError::integrity(format!("malformed webfinger response: {e}")))
    }
}

fn urlencoding_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
