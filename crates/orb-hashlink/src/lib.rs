pub mod metadata;
pub mod parse;
pub mod resolver;

pub use metadata::HashlinkMetadata;
pub use parse::{to_cid_v1, HashWithHint, Scheme};
pub use resolver::Resolver;
