//! On-chain token URI reads over Ethereum JSON-RPC.
//!
//! Calls `tokenURI(uint256)` (ERC721) or `uri(uint256)` (ERC1155) with
//! `eth_call` against the latest block and decodes the ABI `string` result.
//! ERC1155 URIs are returned untouched: `{id}` substitution is left to the
//! metadata resolver.

use anyhow::{Context, Result};
use primitive_types::{H160, U256};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

use crate::{u256_to_word, word_to_u256};

/// Token standard hint for URI fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStandard {
    Erc721,
    Erc1155,
}

impl TokenStandard {
    /// 4-byte function selector of the standard's URI getter.
    pub const fn selector(self) -> [u8; 4] {
        match self {
            // keccak256("tokenURI(uint256)")[..4]
            TokenStandard::Erc721 => [0xc8, 0x7b, 0x56, 0xdd],
            // keccak256("uri(uint256)")[..4]
            TokenStandard::Erc1155 => [0x0e, 0x89, 0x34, 0x1c],
        }
    }
}

impl std::fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStandard::Erc721 => write!(f, "ERC721"),
            TokenStandard::Erc1155 => write!(f, "ERC1155"),
        }
    }
}

/// Read capability for a token's metadata URI.
#[async_trait::async_trait]
pub trait TokenUriReader: Send + Sync + 'static {
    /// Returns the raw URI (possibly an ERC1155 `{id}` template), or None
    /// when the contract returns an empty string.
    async fn read_token_uri(
        &self,
        contract: H160,
        token_id: U256,
        standard: TokenStandard,
    ) -> Result<Option<String>>;
}

/// Parse a `0x`-prefixed 20-byte address.
pub fn parse_address(addr: &str) -> Result<H160> {
    let hex_str = addr
        .trim()
        .strip_prefix("0x")
        .or_else(|| addr.trim().strip_prefix("0X"))
        .unwrap_or(addr.trim());
    let bytes = hex::decode(hex_str).with_context(|| format!("Invalid address {addr}"))?;
    if bytes.len() != 20 {
        anyhow::bail!("Invalid address {addr}: expected 20 bytes, got {}", bytes.len());
    }
    Ok(H160::from_slice(&bytes))
}

/// Build the `eth_call` data for a URI getter.
pub fn encode_uri_call(standard: TokenStandard, token_id: U256) -> String {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&standard.selector());
    data.extend_from_slice(&u256_to_word(token_id));
    format!("0x{}", hex::encode(data))
}

/// Decode an ABI-encoded dynamic `string` return value.
///
/// Layout: `[offset word][..][length word at offset][bytes]`.
pub fn decode_abi_string(data: &[u8]) -> Option<String> {
    if data.len() < 64 {
        return None;
    }

    let offset = word_to_usize(&data[..32])?;
    let len_end = offset.checked_add(32)?;
    let len = word_to_usize(data.get(offset..len_end)?)?;
    let bytes = data.get(len_end..len_end.checked_add(len)?)?;

    String::from_utf8(bytes.to_vec()).ok()
}

fn word_to_usize(word: &[u8]) -> Option<usize> {
    let value = word_to_u256(word);
    if value.bits() > 32 {
        return None;
    }
    Some(value.low_u64() as usize)
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Reads token URIs with `eth_call` through a JSON-RPC endpoint.
pub struct JsonRpcUriReader {
    client: reqwest::Client,
    rpc_url: Url,
    next_id: AtomicU64,
}

impl JsonRpcUriReader {
    pub fn new(rpc_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), rpc_url)
    }

    pub fn with_client(client: reqwest::Client, rpc_url: Url) -> Self {
        Self {
            client,
            rpc_url,
            next_id: AtomicU64::new(1),
        }
    }

    /// Execute `eth_call` and return the raw return data.
    async fn eth_call(&self, to: H160, data: String) -> Result<Vec<u8>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": format!("{to:#x}"), "data": data }, "latest"],
        });

        let response: RpcResponse = self
            .client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .context("eth_call request failed")?
            .error_for_status()
            .context("eth_call returned an HTTP error")?
            .json()
            .await
            .context("eth_call returned an invalid JSON-RPC response")?;

        if let Some(error) = response.error {
            anyhow::bail!("eth_call failed ({}): {}", error.code, error.message);
        }

        let result = response
            .result
            .context("eth_call response has neither result nor error")?;
        let hex_str = result.strip_prefix("0x").unwrap_or(&result);
        hex::decode(hex_str).context("eth_call result is not valid hex")
    }
}

#[async_trait::async_trait]
impl TokenUriReader for JsonRpcUriReader {
    async fn read_token_uri(
        &self,
        contract: H160,
        token_id: U256,
        standard: TokenStandard,
    ) -> Result<Option<String>> {
        let data = encode_uri_call(standard, token_id);
        let raw = self.eth_call(contract, data).await.with_context(|| {
            format!("Failed to read {standard} URI of token {token_id} on {contract:#x}")
        })?;

        if raw.is_empty() {
            tracing::debug!(
                target: "cartesiscan_common::token_uri",
                contract = %format!("{contract:#x}"),
                token_id = %token_id,
                "Contract returned no data for URI call"
            );
            return Ok(None);
        }

        let uri = decode_abi_string(&raw)
            .with_context(|| format!("Undecodable {standard} URI returned by {contract:#x}"))?;

        tracing::debug!(
            target: "cartesiscan_common::token_uri",
            contract = %format!("{contract:#x}"),
            token_id = %token_id,
            uri = %uri,
            "Read token URI"
        );

        Ok((!uri.is_empty()).then_some(uri))
    }
}
