//! CartesiScan - token metadata resolution for Cartesi rollups explorers.
//!
//! The [`metadata`] module resolves ERC1155 metadata URI templates into JSON
//! documents, with per-resolver memoization and cancellation of superseded
//! fetches. [`lookup`] wires it to an on-chain URI read.

pub mod error;
pub mod lookup;
pub mod metadata;

pub use cartesiscan_common::{parse_token_id, JsonRpcUriReader, TokenStandard, TokenUriReader};
pub use error::MetadataError;
pub use lookup::TokenMetadataLookup;
pub use metadata::{
    MetadataResult, ReqwestMetadataHttp, ResolutionState, ResolverConfig, TokenMetadataResolver,
};
pub use primitive_types::{H160, U256};
