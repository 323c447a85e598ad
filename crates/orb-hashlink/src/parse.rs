//! Parsing rules for `hashWithHint` (§4.1):
//!
//! - a bare multihash: resource hash, no hints.
//! - `hl:<hash>[:<metadata>]`: metadata decodes to an ordered list of links.
//! - `https:<host>[:<port>]:<hash>` / `http:…`: single HTTP(S) domain hint.
//! - `ipfs:<hash>`: IPFS hint; resource hash is converted to a v1 CID.

use crate::metadata::HashlinkMetadata;
use orb_core::cas::{parse_multihash, ResourceHash};
use orb_core::error::{OrbError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashWithHint {
    /// A bare multihash, no retrieval hints.
    Bare { hash: ResourceHash },
    /// `hl:<hash>[:<metadata>]`.
    Hashlink {
        hash: ResourceHash,
        links: Vec<String>,
    },
    /// `https:<host>[:<port>]:<hash>` / `http:…`.
    DomainHint {
        scheme: Scheme,
        host: String,
        port: Option<u16>,
        hash: ResourceHash,
    },
    /// `ipfs:<hash>`.
    Ipfs { hash: ResourceHash },
}

impl HashWithHint {
    pub fn hash(&self) -> &ResourceHash {
        match self {
            HashWithHint::Bare { hash }
            | HashWithHint::Hashlink { hash, .. }
            | HashWithHint::DomainHint { hash, .. }
            | HashWithHint::Ipfs { hash } => hash,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix("hl:") {
            let mut parts = rest.splitn(2, ':');
            let hash_str = parts
                .next()
                .ok_or_else(|| OrbError::integrity("missing hash in hl: form"))?;
            let hash = parse_multihash(hash_str)?;
            let links = match parts.next() {
                Some(meta) if !meta.is_empty() => HashlinkMetadata::decode(meta)?.urls,
                _ => Vec::new(),
            };
            return Ok(HashWithHint::Hashlink { hash, links });
        }
        if let Some(rest) = s.strip_prefix("https:") {
            return Self::parse_domain_hint(Scheme::Https, rest);
        }
        if let Some(rest) = s.strip_prefix("http:") {
            return Self::parse_domain_hint(Scheme::Http, rest);
        }
        if let Some(rest) = s.strip_prefix("ipfs:") {
            let hash = parse_multihash(rest)?;
            return Ok(HashWithHint::Ipfs { hash });
        }
        let hash = parse_multihash(s)?;
        Ok(HashWithHint::Bare { hash })
    }

    fn parse_domain_hint(scheme: Scheme, rest: &str) -> Result<Self> {
        // `<host>[:<port>]:<hash>`
        let parts: Vec<&str> = rest.split(':').collect();
        let (host, port, hash_str) = match parts.as_slice() {
            [host, hash] => (*host, None, *hash),
            [host, port, hash] => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| OrbError::integrity(format!("bad port in {rest:?}")))?;
                (*host, Some(port), *hash)
            }
            _ => return Err(OrbError::integrity(format!("malformed domain hint {rest:?}"))),
        };
        let hash = parse_multihash(hash_str)?;
        Ok(HashWithHint::DomainHint {
            scheme,
            host: host.to_string(),
            port,
            hash,
        })
    }
}

/// Convert a resource hash to a v1 CID string for IPFS retrieval (§4.1 ipfs
/// hint rule). Uses the raw codec (0x55) since the resource hash is over
/// opaque anchor bytes, not a typed IPLD structure.
pub fn to_cid_v1(hash: &ResourceHash) -> Result<String> {
    const RAW_CODEC: u64 = 0x55;
    let cid = cid::Cid::new_v1(RAW_CODEC, hash.clone());
    Ok(cid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orb_core::cas::multihash;

    #[test]
    fn parses_bare_multihash() {
        let h = multihash(b"x");
        let wire = orb_core::cas::format_multihash(&h);
        let parsed = HashWithHint::parse(&wire).unwrap();
        assert!(matches!(parsed, HashWithHint::Bare { .. }));
        assert_eq!(parsed.hash(), &h);
    }

    #[test]
    fn parses_hl_with_metadata() {
        let h = multihash(b"x");
        let wire = orb_core::cas::format_multihash(&h);
        let meta = HashlinkMetadata::new(vec!["ipfs://bafy".into()]).encode().unwrap();
        let s = format!("hl:{wire}:{meta}");
        match HashWithHint::parse(&s).unwrap() {
            HashWithHint::Hashlink { links, .. } => assert_eq!(links, vec!["ipfs://bafy"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_https_domain_hint_with_port() {
        let h = multihash(b"x");
        let wire = orb_core::cas::format_multihash(&h);
        let s = format!("https:host:8080:{wire}");
        match HashWithHint::parse(&s).unwrap() {
            HashWithHint::DomainHint { host, port, scheme, .. } => {
                assert_eq!(host, "host");
                assert_eq!(port, Some(8080));
                assert_eq!(scheme, Scheme::Https);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_ipfs_hint() {
        let h = multihash(b"x");
        let wire = orb_core::cas::format_multihash(&h);
        let s = format!("ipfs:{wire}");
        assert!(matches!(HashWithHint::parse(&s).unwrap(), HashWithHint::Ipfs { .. }));
    }
}
