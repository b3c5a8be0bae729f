//! Chain read followed by metadata resolution.

use anyhow::Result;
use cartesiscan_common::{TokenStandard, TokenUriReader};
use primitive_types::{H160, U256};

use crate::metadata::{MetadataHttp, MetadataResult, TokenMetadataResolver};

/// Reads a token's metadata URI on chain and resolves it.
pub struct TokenMetadataLookup<R, H> {
    reader: R,
    resolver: TokenMetadataResolver<H>,
}

impl<R: TokenUriReader, H: MetadataHttp> TokenMetadataLookup<R, H> {
    pub fn new(reader: R, resolver: TokenMetadataResolver<H>) -> Self {
        Self { reader, resolver }
    }

    pub fn resolver(&self) -> &TokenMetadataResolver<H> {
        &self.resolver
    }

    /// Resolve the metadata of `token_id` on `contract`.
    ///
    /// A contract returning an empty URI resolves to `idle`. Failing to read
    /// the URI at all is an error of the chain layer and is returned as such.
    pub async fn lookup(
        &self,
        contract: H160,
        token_id: U256,
        standard: TokenStandard,
    ) -> Result<MetadataResult> {
        let uri = self
            .reader
            .read_token_uri(contract, token_id, standard)
            .await?;

        if uri.is_none() {
            tracing::info!(
                target: "cartesiscan::lookup",
                contract = %format!("{contract:#x}"),
                token_id = %token_id,
                "Contract has no metadata URI for token"
            );
        }

        Ok(self.resolver.resolve(uri.as_deref(), Some(token_id)).await)
    }
}
