pub mod credential;
pub mod graph;
pub mod linkset;
pub mod payload;

pub use credential::AnchorCredential;
pub use graph::{AnchorGraph, CompressionConfig};
pub use linkset::LinksetDocument;
pub use payload::AnchorPayload;
