//! The CAS resolver (§4.1): `Resolve(webCasURL?, hashWithHint, data?) ->
//! (bytes, hashlink)` and `Write(bytes) -> hashlink`.

use crate::metadata::HashlinkMetadata;
use crate::parse::{to_cid_v1, HashWithHint, Scheme};
use orb_core::cas::{format_multihash, CasStorage, IpfsReader, ResourceHash};
use orb_core::error::{Kind, OrbError, Result};
use orb_transport::WebFingerClient;
use std::sync::Arc;

pub struct Resolver {
    cas: Arc<dyn CasStorage>,
    ipfs: Option<Arc<dyn IpfsReader>>,
    http: reqwest::Client,
    webfinger: WebFingerClient,
    /// Local endpoint encoded into hashlinks this node writes, so peers know
    /// where to fetch from (§4.1 "`Write` ... metadata encodes the local
    /// writer's endpoint").
    local_endpoint: String,
    /// When true, an IPFS hint is read directly from IPFS ahead of the local
    /// CAS (§4.1 resolution step 1).
    primary_ipfs: bool,
}

impl Resolver {
    pub fn new(
        cas: Arc<dyn CasStorage>,
        ipfs: Option<Arc<dyn IpfsReader>>,
        http: reqwest::Client,
        local_endpoint: impl Into<String>,
        primary_ipfs: bool,
    ) -> Self {
        Self {
            cas,
            ipfs,
            http: http.clone(),
            webfinger: WebFingerClient::new(http),
            local_endpoint: local_endpoint.into(),
            primary_ipfs,
        }
    }

    fn build_hashlink(&self, hash: &ResourceHash) -> Result<String> {
        let wire = format_multihash(hash);
        let metadata = HashlinkMetadata::new(vec![format!("{}/{wire}", self.local_endpoint)]);
        Ok(format!("hl:{wire}:{}", metadata.encode()?))
    }

    /// `Write(bytes) -> hashlink`. Idempotent: identical bytes hash
    /// identically, so re-writing yields the same hashlink.
    pub async fn write(&self, bytes: &[u8]) -> Result<String> {
        let hash = self.cas.write(bytes).await?;
        self.build_hashlink(&hash)
    }

    /// `Resolve(webCasURL?, hashWithHint, data?) -> (bytes, hashlink)`.
    pub async fn resolve(
        &self,
        web_cas_url: Option<&str>,
        hint: &HashWithHint,
        data: Option<&[u8]>,
    ) -> Result<(Vec<u8>, String)> {
        let hash = hint.hash().clone();

        if let Some(bytes) = data {
            return self.verify_and_store(&hash, bytes.to_vec()).await;
        }

        if self.primary_ipfs {
            if let HashWithHint::Ipfs { .. } = hint {
                let cid = to_cid_v1(&hash)?;
                let bytes = self.ipfs_reader()?.read(&cid).await?;
                return Ok((bytes, self.build_hashlink(&hash)?));
            }
        }

        match self.cas.read(&hash).await {
            Ok(bytes) => return Ok((bytes, self.build_hashlink(&hash)?)),
            Err(e) if e.is(Kind::NotFound) => {}
            Err(e) => return Err(e),
        }

        let mut http_links: Vec<String> = Vec::new();
        if let Some(url) = web_cas_url {
            http_links.push(url.to_string());
        }

        let bytes = match hint {
            HashWithHint::Hashlink { links, .. } => {
                http_links.extend(
                    links
                        .iter()
                        .filter(|l| l.starts_with("http://") || l.starts_with("https://"))
                        .cloned(),
                );
                let ipfs_links: Vec<String> = links
                    .iter()
                    .filter_map(|l| l.strip_prefix("ipfs://").map(str::to_string))
                    .collect();
                self.resolve_via_links(&http_links, &ipfs_links, &hash)
                    .await?
            }
            HashWithHint::Ipfs { .. } => {
                let cid = to_cid_v1(&hash)?;
                self.ipfs_reader()?.read(&cid).await?
            }
            HashWithHint::DomainHint {
                scheme, host, port, ..
            } => {
                if !http_links.is_empty() {
                    match self.resolve_via_links(&http_links, &[], &hash).await {
                        Ok(bytes) => bytes,
                        Err(_) => self.resolve_via_domain_hint(scheme, host, *port, &hash).await?,
                    }
                } else {
                    self.resolve_via_domain_hint(scheme, host, *port, &hash).await?
                }
            }
            HashWithHint::Bare { .. } => {
                if http_links.is_empty() {
                    return Err(OrbError::not_found(format!(
                        "no retrieval hint for {}",
                        format_multihash(&hash)
                    )));
                }
                self.resolve_via_links(&http_links, &[], &hash).await?
            }
        };

        self.verify_and_store(&hash, bytes).await
    }

    fn ipfs_reader(&self) -> Result<&dyn IpfsReader> {
        self.ipfs
            .as_deref()
            .ok_or_else(|| OrbError::not_found("no ipfs reader configured"))
    }

    /// Step 3 + 4: iterate HTTP links (first success wins, 5xx is
    /// transient), then IPFS links if every HTTP attempt failed.
    async fn resolve_via_links(
        &self,
        http_links: &[String],
        ipfs_links: &[String],
        hash: &ResourceHash,
    ) -> Result<Vec<u8>> {
        let mut any_transient = false;
        let mut last_err = String::new();

        for link in http_links {
            match self.http_get(link).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    any_transient |= e.is(Kind::Transient);
                    last_err = e.to_string();
                }
            }
        }
        for cid in ipfs_links {
            if let Some(ipfs) = &self.ipfs {
                match ipfs.read(cid).await {
                    Ok(bytes) => return Ok(bytes),
                    Err(e) => {
                        any_transient |= e.is(Kind::Transient);
                        last_err = e.to_string();
                    }
                }
            }
        }

        let message = format!(
            "all cas links exhausted for {}: {last_err}",
            format_multihash(hash)
        );
        if any_transient {
            Err(OrbError::transient(message))
        } else {
            Err(OrbError::not_found(message))
        }
    }

    /// Step 5: WebFinger the domain hint for `/cas/<hash>` to obtain a
    /// `working-copy` link, then GET it.
    async fn resolve_via_domain_hint(
        &self,
        scheme: &Scheme,
        host: &str,
        port: Option<u16>,
        hash: &ResourceHash,
    ) -> Result<Vec<u8>> {
        let scheme_str = match scheme {
            Scheme::Http => "http",
            Scheme::Https => "https",
        };
        let authority = match port {
            Some(p) => format!("{host}:{p}"),
            None => host.to_string(),
        };
        let resource = format!("{scheme_str}://{authority}/cas/{}", format_multihash(hash));
        let response = self.webfinger.resolve(&authority, &resource).await?;
        let link = response
            .link_with_rel("working-copy")
            .and_then(|l| l.href.clone())
            .ok_or_else(|| OrbError::not_found(format!("no working-copy link for {resource}")))?;
        self.http_get(&link).await
    }

    async fn http_get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| OrbError::transient(format!("cas link {url} request failed: {e}")))?;
        if response.status().is_server_error() {
            return Err(OrbError::transient(format!(
                "cas link {url} returned {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(OrbError::not_found(format!(
                "cas link {url} returned {}",
                response.status()
            )));
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| OrbError::transient(format!("cas link {url} body read failed: {e}")))
    }

    /// On remote success, write locally and verify the local hash matches
    /// the caller-supplied hash (§4.1 "verify that the local CAS's
    /// deterministic hash equals the caller-supplied resource hash").
    async fn verify_and_store(
        &self,
        hash: &ResourceHash,
        bytes: Vec<u8>,
    ) -> Result<(Vec<u8>, String)> {
        let stored = self.cas.write(&bytes).await?;
        if &stored != hash {
            return Err(OrbError::integrity(format!(
                "resolved bytes hash {} does not match requested {}",
                format_multihash(&stored),
                format_multihash(hash)
            )));
        }
        let hashlink = self.build_hashlink(hash)?;
        Ok((bytes, hashlink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orb_core::cas::MemoryCas;

    fn resolver() -> Resolver {
        Resolver::new(
            Arc::new(MemoryCas::new()),
            None,
            reqwest::Client::new(),
            "https://node.example/cas",
            false,
        )
    }

    #[tokio::test]
    async fn write_then_resolve_from_local_cas() {
        let r = resolver();
        let hl = r.write(b"payload").await.unwrap();
        assert!(hl.starts_with("hl:"));

        let hint = HashWithHint::parse(&hl).unwrap();
        let (bytes, hl2) = r.resolve(None, &hint, None).await.unwrap();
        assert_eq!(bytes, b"payload");
        assert_eq!(hl, hl2);
    }

    #[tokio::test]
    async fn supplied_data_is_verified_against_hash() {
        let r = resolver();
        let hash = orb_core::cas::multihash(b"payload");
        let hint = HashWithHint::Bare { hash };
        let (bytes, _) = r.resolve(None, &hint, Some(b"payload")).await.unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[tokio::test]
    async fn supplied_data_mismatch_is_integrity_error() {
        let r = resolver();
        let hash = orb_core::cas::multihash(b"expected");
        let hint = HashWithHint::Bare { hash };
        let err = r.resolve(None, &hint, Some(b"actual")).await.unwrap_err();
        assert!(err.is(Kind::Integrity));
    }

    #[tokio::test]
    async fn bare_hint_with_no_hint_source_is_not_found() {
        let r = resolver();
        let hash = orb_core::cas::multihash(b"missing");
        let hint = HashWithHint::Bare { hash };
        let err = r.resolve(None, &hint, None).await.unwrap_err();
        assert!(err.is(Kind::NotFound));
    }

    #[tokio::test]
    async fn bare_hint_resolves_via_web_cas_url_and_stores_locally() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blob"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"remote-payload".to_vec()))
            .mount(&server)
            .await;

        let r = resolver();
        let hash = orb_core::cas::multihash(b"remote-payload");
        let hint = HashWithHint::Bare { hash };
        let web_cas_url = format!("{}/blob", server.uri());
        let (bytes, hashlink) = r.resolve(Some(&web_cas_url), &hint, None).await.unwrap();

        assert_eq!(bytes, b"remote-payload");
        assert!(hashlink.starts_with("hl:"));
    }
}
