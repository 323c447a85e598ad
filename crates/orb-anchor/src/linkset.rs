//! The outer shape validation for a CAS-stored anchor linkset document
//! (§4.3 Read: "Reject payloads that are neither collection nor
//! ordered-collection shapes at the outer layer"). Wraps the activity-level
//! [`orb_core::activity::AnchorLinkset`] entries an anchor event carries.

use orb_core::activity::AnchorLinkset;
use orb_core::error::{OrbError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LinksetDocument {
    Collection { items: Vec<AnchorLinkset> },
    #[serde(rename = "OrderedCollection")]
    OrderedCollection {
        #[serde(rename = "orderedItems")]
        ordered_items: Vec<AnchorLinkset>,
    },
}

impl LinksetDocument {
    pub fn single(link: AnchorLinkset) -> Self {
        LinksetDocument::OrderedCollection {
            ordered_items: vec![link],
        }
    }

    pub fn items(&self) -> &[AnchorLinkset] {
        match self {
            LinksetDocument::Collection { items } => items,
            LinksetDocument::OrderedCollection { ordered_items } => ordered_items,
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            OrbError::integrity(format!(
                "anchor linkset is neither collection nor ordered-collection shape: {e}"
            ))
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| OrbError::integrity(format!("encode anchor linkset: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ordered_collection() {
        let link = AnchorLinkset {
            hashlink: "hl:abc".into(),
            anchor_origin: Some("https://orb.example".into()),
            credential: b"{}".to_vec(),
        };
        let doc = LinksetDocument::single(link);
        let bytes = doc.to_bytes().unwrap();
        let parsed = LinksetDocument::parse(&bytes).unwrap();
        assert_eq!(parsed.items().len(), 1);
    }

    #[test]
    fn rejects_unknown_outer_shape() {
        let err = LinksetDocument::parse(br#"{"type":"Note","items":[]}"#).unwrap_err();
        assert!(err.is(orb_core::error::Kind::Integrity));
    }
}
