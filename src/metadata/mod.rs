//! Token metadata resolution.
//!
//! Given an ERC1155 metadata URI template and a token id, substitutes the id,
//! validates the URL, fetches the JSON document over HTTP and classifies the
//! outcome into a [`ResolutionState`].

pub mod cache;
pub mod document;
pub mod fetch;
pub mod key;
pub mod resolver;
pub mod state;
pub mod uri;

pub use cache::MetadataCache;
pub use document::TokenMetadataDocument;
pub use fetch::{FetchOutcome, HttpResponse, MetadataHttp, ReqwestMetadataHttp};
pub use key::MetadataQueryKey;
pub use resolver::{ResolverConfig, TokenMetadataResolver};
pub use state::{classify, MetadataResult, ResolutionState, DEFAULT_IPFS_GATEWAY};
pub use uri::{substitute_token_id, PreparedUrl, UrlKind};
